//! Server transfer engine.
//!
//! Binds a path prefix to a local directory and answers exactly one PUT or
//! GET on its framing channel, then closes the link. Instances are cheap:
//! one engine per accepted connection.

use std::fmt::Write as _;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use fileferry_file_body::FileBody;
use fileferry_http::{
    shared, Request, Response, Shared, Verb, STATUS_BAD_REQUEST, STATUS_NOT_FOUND, STATUS_OK,
    STATUS_UNAUTHORIZED,
};

use crate::channel::FramingChannel;
use crate::integrity::{Integrity, NoIntegrity};
use crate::lock;

/// Hooks the application implements around a [`ServerTransfer`].
pub trait ServerHooks<B> {
    /// Authorization hook. `None` permits the request; `Some(message)`
    /// rejects it, and the message becomes the 401 body.
    fn authorize(&mut self, request: &Request<B>) -> Option<String>;
}

/// Server transfer engine over a framing channel `C`, a file body `B` and
/// an integrity policy `I`.
///
/// Requests below the configured path prefix are stored (PUT) or served
/// (GET); anything else is rejected with 400. The single response object
/// and file body are composite sub-objects reused for the engine's
/// one-connection lifetime.
pub struct ServerTransfer<C, B, H, I = NoIntegrity> {
    channel: C,
    hooks: Mutex<H>,
    prefix: String,
    response: Shared<Response<B>>,
    body: Shared<B>,
    _integrity: PhantomData<I>,
}

impl<C, B, H, I> ServerTransfer<C, B, H, I>
where
    C: FramingChannel<Tx = Response<B>>,
    B: FileBody,
    H: ServerHooks<B>,
    I: Integrity<B>,
{
    /// Creates an engine serving files below `prefix`.
    ///
    /// `prefix` must be empty or end in `/`: it names the directory the
    /// request path is appended to.
    pub fn new(prefix: impl Into<String>, channel: C, hooks: H) -> Self
    where
        B: Default,
    {
        let prefix = prefix.into();
        assert!(
            prefix.is_empty() || prefix.ends_with('/'),
            "path prefix must be empty or end in '/'"
        );
        Self {
            channel,
            hooks: Mutex::new(hooks),
            prefix,
            response: shared(Response::new()),
            body: shared(B::default()),
            _integrity: PhantomData,
        }
    }

    fn target_path(&self, request_path: &str) -> PathBuf {
        let mut target = String::with_capacity(self.prefix.len() + request_path.len());
        target.push_str(&self.prefix);
        target.push_str(request_path.trim_start_matches('/'));
        PathBuf::from(target)
    }

    // --- upcalls delivered by the framing layer ---------------------------

    /// Request headers are complete. For a PUT the target file is created
    /// and attached as the body sink, so the payload streams straight to
    /// disk; any other verb carries no body of interest.
    pub fn link_body(&self, request: &mut Request<B>) {
        if request.verb != Verb::Put {
            return;
        }

        let mut body = lock(&self.body);
        body.assign(&self.target_path(&request.path));
        match body.create() {
            Ok(()) => {
                debug!(path = %request.path, "upload sink attached");
                request.body = Some(self.body.clone());
            }
            Err(error) => {
                warn!(path = %request.path, %error, "could not create upload target");
            }
        }
    }

    /// A complete request has arrived: classify it, fill the response and
    /// submit it. Exactly one response is submitted per request.
    pub fn received(&self, request: Request<B>) {
        {
            let mut response = lock(&self.response);
            response.reset();

            match request.verb {
                Verb::Put => self.handle_put(&request, &mut response),
                Verb::Get => self.handle_get(&request, &mut response),
                verb => {
                    warn!(%verb, "unknown command");
                    response.status = STATUS_BAD_REQUEST;
                    response.message.push_str("Unknown command received.");
                }
            }

            debug!(status = response.status, path = %request.path, "response ready");
        }

        self.channel.submit(self.response.clone());
    }

    /// The response has been fully transmitted; this connection is done.
    pub fn sent(&self, response: &Shared<Response<B>>) {
        debug_assert!(Arc::ptr_eq(response, &self.response));
        let _ = response;
        self.channel.close(0);
    }

    /// Link state changes carry no extra work on the server side.
    pub fn state_change(&self) {}

    fn handle_put(&self, request: &Request<B>, response: &mut Response<B>) {
        let mut body = lock(&self.body);

        if !body.is_open() {
            response.status = STATUS_NOT_FOUND;
            let _ = write!(
                response.message,
                "File: {} could not be stored server side.",
                request.path
            );
            return;
        }

        if !I::verify(&mut body, request.content_signature.as_ref()) {
            response.status = STATUS_UNAUTHORIZED;
            let _ = write!(
                response.message,
                "File: {} has an incorrect signature.",
                request.path
            );
        } else if let Some(message) = lock(&self.hooks).authorize(request) {
            response.status = STATUS_UNAUTHORIZED;
            response.message.push_str(&message);
        } else {
            response.status = STATUS_OK;
            let _ = write!(
                response.message,
                "File: {} has been stored server side.",
                request.path
            );
        }

        if response.status == STATUS_OK {
            body.close();
        } else {
            // The payload cannot be trusted; do not keep it around.
            if let Err(error) = body.destroy() {
                warn!(path = %request.path, %error, "could not remove rejected upload");
            }
        }
    }

    fn handle_get(&self, request: &Request<B>, response: &mut Response<B>) {
        let mut body = lock(&self.body);
        body.assign(&self.target_path(&request.path));

        if !body.exists() {
            response.status = STATUS_NOT_FOUND;
            let _ = write!(
                response.message,
                "File: {} was not found server side.",
                request.path
            );
            return;
        }

        if let Some(message) = lock(&self.hooks).authorize(request) {
            response.status = STATUS_UNAUTHORIZED;
            response.message.push_str(&message);
            return;
        }

        if body.open(true).is_err() {
            response.status = STATUS_NOT_FOUND;
            let _ = write!(
                response.message,
                "File: {} was not found server side.",
                request.path
            );
            return;
        }

        match I::sign(&mut body) {
            Ok(signature) => response.content_signature = signature,
            Err(error) => warn!(path = %request.path, %error, "could not sign response body"),
        }
        response.content_length = Some(body.size());
        response.body = Some(self.body.clone());
    }
}
