//! Contract between the engines and the HTTP framing layer.
//!
//! The framing layer is the link-bound bundle that parses inbound HTTP
//! messages and serializes outbound ones. Engines drive it through the
//! [`FramingChannel`] downcalls below; the framing layer drives the engine
//! back through the engine's public upcall methods (`link_body`,
//! `received`, `sent`, `state_change`).
//!
//! # Upcall rules
//!
//! - Upcalls may be delivered from an I/O worker thread distinct from the
//!   API caller; engines serialize them internally.
//! - A downcall must never invoke an upcall synchronously: the engines
//!   issue the non-blocking downcalls (`open(0)`, `submit`, `close(0)`)
//!   while holding their admin lock, and a reentrant upcall would
//!   deadlock. The blocking [`INFINITE`] close is issued without the
//!   admin lock so a final upcall can still run.
//! - `link_body` is delivered once headers are complete, before any body
//!   byte; `received` once the message is complete; `sent` once an
//!   outbound message has been fully transmitted.

use std::io;

use fileferry_http::Shared;

/// Timeout meaning "block until the link is fully torn down".
pub const INFINITE: u32 = u32::MAX;

/// Downcall surface of the framing layer.
///
/// The channel is constructed over a single-element outbound factory: at
/// most one message is in flight, and a submitted message is only reused
/// after the corresponding sent upcall.
///
/// Implementations are internally synchronized: downcalls take `&self`
/// and may arrive from the API thread while the framing layer's own I/O
/// worker is active.
pub trait FramingChannel {
    /// Outbound message type.
    type Tx;

    /// Underlying link transport.
    type Link;

    /// Starts opening the link, waiting up to `timeout_ms` milliseconds
    /// for it to come up. The engines pass 0 and treat the call as
    /// non-blocking configuration; completion is reported through a later
    /// `state_change` upcall.
    fn open(&self, timeout_ms: u32) -> io::Result<()>;

    /// Closes the link, waiting up to `timeout_ms` milliseconds
    /// ([`INFINITE`] blocks until torn down).
    fn close(&self, timeout_ms: u32);

    /// Queues `message` for transmission.
    fn submit(&self, message: Shared<Self::Tx>);

    /// Discards any queued but untransmitted element.
    fn flush(&self);

    fn is_open(&self) -> bool;

    fn is_closed(&self) -> bool;

    fn is_suspended(&self) -> bool;

    /// Access to the underlying link, e.g. for TLS or socket options set
    /// up by the application's `setup` hook.
    fn link(&self) -> &Self::Link;

    fn link_mut(&mut self) -> &mut Self::Link;
}
