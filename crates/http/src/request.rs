//! Outbound/inbound HTTP request as seen by the engines.

use std::fmt;

use crate::signature::Signature;
use crate::Shared;

/// Request verb.
///
/// The client engine only ever generates [`Verb::Get`] and [`Verb::Put`];
/// the remaining verbs exist so a server can classify whatever a peer sent
/// and reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verb {
    #[default]
    Get,
    Put,
    Post,
    Delete,
    Head,
    Options,
}

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Put => "PUT",
            Verb::Post => "POST",
            Verb::Delete => "DELETE",
            Verb::Head => "HEAD",
            Verb::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutable HTTP request.
///
/// One request object serves an engine for its whole lifetime: fields are
/// cleared with [`Request::reset`] between transfers instead of the object
/// being reallocated, so string capacity is retained.
pub struct Request<B> {
    pub verb: Verb,
    pub path: String,
    pub host: String,
    pub content_length: Option<u64>,
    pub content_signature: Option<Signature>,
    pub body: Option<Shared<B>>,
}

impl<B> Request<B> {
    pub fn new() -> Self {
        Self {
            verb: Verb::Get,
            path: String::new(),
            host: String::new(),
            content_length: None,
            content_signature: None,
            body: None,
        }
    }

    /// Returns every field to its default without releasing buffers.
    pub fn reset(&mut self) {
        self.verb = Verb::Get;
        self.path.clear();
        self.host.clear();
        self.content_length = None;
        self.content_signature = None;
        self.body = None;
    }
}

impl<B> Default for Request<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> fmt::Debug for Request<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("verb", &self.verb)
            .field("path", &self.path)
            .field("host", &self.host)
            .field("content_length", &self.content_length)
            .field("content_signature", &self.content_signature)
            .field("body", &self.body.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_fields_and_keeps_capacity() {
        let mut request: Request<()> = Request::new();
        request.verb = Verb::Put;
        request.path = String::from("/some/long/enough/path/to/allocate");
        request.host = String::from("files.example.com");
        request.content_length = Some(1024);

        let path_capacity = request.path.capacity();
        request.reset();

        assert_eq!(request.verb, Verb::Get);
        assert!(request.path.is_empty());
        assert!(request.host.is_empty());
        assert_eq!(request.content_length, None);
        assert!(request.content_signature.is_none());
        assert!(request.body.is_none());
        assert_eq!(request.path.capacity(), path_capacity);
    }

    #[test]
    fn verb_wire_names() {
        assert_eq!(Verb::Get.as_str(), "GET");
        assert_eq!(Verb::Put.as_str(), "PUT");
        assert_eq!(Verb::Delete.to_string(), "DELETE");
    }
}
