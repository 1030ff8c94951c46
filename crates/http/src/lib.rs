//! HTTP message model shared by the transfer engines.
//!
//! Messages are plain data: the framing layer owns parsing and
//! serialization, the engines fill in and inspect fields. Bodies are
//! attached through [`Shared`] handles so a single engine-owned file body
//! can be lent to the framing layer for the duration of one exchange.

pub mod request;
pub mod response;
pub mod signature;

pub use request::{Request, Verb};
pub use response::Response;
pub use signature::{HashKind, Signature, SignatureParseError};

use std::sync::{Arc, Mutex};

/// Reference-counted handle through which the framing layer borrows
/// engine-owned messages and bodies.
///
/// The engine bootstraps these handles at construction and keeps them for
/// its whole lifetime; clones handed out during an exchange must not
/// outlive the upcall cycle that delivered them.
pub type Shared<T> = Arc<Mutex<T>>;

/// Wraps a value in a [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

/// 200 OK.
pub const STATUS_OK: u16 = 200;

/// 400 Bad Request.
pub const STATUS_BAD_REQUEST: u16 = 400;

/// 401 Unauthorized.
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// 404 Not Found.
pub const STATUS_NOT_FOUND: u16 = 404;
