//! HTTP file-transfer engines.
//!
//! Two engines share one framing contract: [`ClientTransfer`] drives a
//! single upload or download against an HTTP peer, [`ServerTransfer`]
//! answers exactly one PUT or GET per connection. Both are wired to an
//! external framing layer through [`FramingChannel`] downcalls and public
//! upcall methods, and stream their payloads through a
//! [`FileBody`](fileferry_file_body::FileBody) so large content never sits
//! in memory.

pub mod channel;
pub mod client;
pub mod error;
pub mod integrity;
pub mod server;

pub use channel::{FramingChannel, INFINITE};
pub use client::{ClientHooks, ClientTransfer};
pub use error::TransferError;
pub use integrity::{HashedIntegrity, Integrity, NoIntegrity};
pub use server::{ServerHooks, ServerTransfer};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Published engine state; only [`TransferState::Idle`] accepts new work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferState {
    #[default]
    Idle,
    Upload,
    Download,
}

// Completion hooks run user code while the admin lock is held; a panic
// there must not leave the engine wedged behind a poisoned lock.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
