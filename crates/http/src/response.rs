//! Parsed HTTP response as seen by the engines.

use std::fmt;

use crate::signature::Signature;
use crate::{Shared, STATUS_OK};

/// A parsed HTTP response.
///
/// Like [`Request`](crate::Request), one response object is reused across a
/// server engine's lifetime via [`Response::reset`].
pub struct Response<B> {
    /// Numeric status code.
    pub status: u16,
    /// Human-readable message; doubles as the error body for 4xx replies.
    pub message: String,
    pub content_length: Option<u64>,
    pub content_signature: Option<Signature>,
    pub body: Option<Shared<B>>,
}

impl<B> Response<B> {
    pub fn new() -> Self {
        Self {
            status: STATUS_OK,
            message: String::new(),
            content_length: None,
            content_signature: None,
            body: None,
        }
    }

    /// Returns every field to its default without releasing buffers.
    pub fn reset(&mut self) {
        self.status = STATUS_OK;
        self.message.clear();
        self.content_length = None;
        self.content_signature = None;
        self.body = None;
    }
}

impl<B> Default for Response<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> fmt::Debug for Response<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("message", &self.message)
            .field("content_length", &self.content_length)
            .field("content_signature", &self.content_signature)
            .field("body", &self.body.is_some())
            .finish()
    }
}
