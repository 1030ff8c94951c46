//! Client transfer engine.
//!
//! Owns one framing channel configured for outbound requests and inbound
//! responses, and drives a single upload or download per accepted call.
//! The request and file body are composite sub-objects: their shared
//! handles are created at construction and live until the engine is
//! dropped, while the framing layer borrows them between the `link_body`
//! and `received` upcalls.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};
use url::Url;

use fileferry_file_body::FileBody;
use fileferry_http::{
    shared, Request, Response, Shared, Verb, STATUS_NOT_FOUND, STATUS_OK, STATUS_UNAUTHORIZED,
};

use crate::channel::{FramingChannel, INFINITE};
use crate::error::TransferError;
use crate::integrity::{Integrity, NoIntegrity};
use crate::{lock, TransferState};

/// Hooks the application implements around a [`ClientTransfer`].
pub trait ClientHooks<B> {
    /// Configures the link (host, port, TLS) for `remote` before the
    /// transfer starts. Returning `false` rejects the URL.
    fn setup(&mut self, remote: &Url) -> bool;

    /// Terminal completion, delivered exactly once per accepted transfer.
    ///
    /// Invoked with the engine lock held: implementations must not call
    /// back into `upload`/`download` synchronously.
    fn transferred(&mut self, result: Result<(), TransferError>, body: &B);
}

struct Inner<B, H> {
    state: TransferState,
    hooks: H,
    /// Set when the link was not yet open at start time; the parked
    /// request is submitted on the open notification.
    pending_submit: bool,
    response: Option<Response<B>>,
}

/// Client transfer engine over a framing channel `C`, a file body `B` and
/// an integrity policy `I`.
///
/// At most one transfer is in flight; `upload`/`download` reject with
/// [`TransferError::InProgress`] until the terminal `transferred` upcall
/// has returned the engine to idle. The channel lives outside the admin
/// lock; it synchronizes its own downcalls.
pub struct ClientTransfer<C, B, H, I = NoIntegrity> {
    inner: Mutex<Inner<B, H>>,
    channel: C,
    request: Shared<Request<B>>,
    body: Shared<B>,
    _integrity: PhantomData<I>,
}

impl<C, B, H, I> ClientTransfer<C, B, H, I>
where
    C: FramingChannel<Tx = Request<B>>,
    B: FileBody,
    H: ClientHooks<B>,
    I: Integrity<B>,
{
    pub fn new(channel: C, hooks: H) -> Self
    where
        B: Default,
    {
        Self {
            inner: Mutex::new(Inner {
                state: TransferState::Idle,
                hooks,
                pending_submit: false,
                response: None,
            }),
            channel,
            request: shared(Request::new()),
            body: shared(B::default()),
            _integrity: PhantomData,
        }
    }

    /// Starts uploading `source` to `url` with a PUT.
    ///
    /// `source` must be an open, readable file body; it is assigned into
    /// the engine's composite body and handed back through `transferred`.
    pub fn upload(&self, url: &str, source: B) -> Result<(), TransferError> {
        let mut inner = lock(&self.inner);

        if inner.state != TransferState::Idle {
            return Err(TransferError::InProgress);
        }
        let remote = parse_remote(url)?;
        if !inner.hooks.setup(&remote) {
            return Err(TransferError::CouldNotSetAddress);
        }

        assert!(source.is_open(), "upload source must be an open file");

        {
            let mut body = lock(&self.body);
            *body = source;

            let signature =
                I::sign(&mut body).map_err(|_| TransferError::Unavailable)?;
            let pending = body.size().saturating_sub(body.position());

            let mut request = lock(&self.request);
            request.reset();
            request.verb = Verb::Put;
            request.path.push_str(remote.path());
            request.host.push_str(remote.host_str().unwrap_or_default());
            request.content_length = Some(pending);
            request.content_signature = signature;
            request.body = Some(self.body.clone());
        }

        inner.state = TransferState::Upload;
        debug!(url = %remote, "upload accepted");
        self.start_transfer(&mut inner)
    }

    /// Starts downloading `url` into `destination` with a GET.
    ///
    /// `destination` must be an open, writable file body. The response
    /// body is attached once headers arrive, so content streams straight
    /// into the file.
    pub fn download(&self, url: &str, destination: B) -> Result<(), TransferError> {
        let mut inner = lock(&self.inner);

        if inner.state != TransferState::Idle {
            return Err(TransferError::InProgress);
        }
        let remote = parse_remote(url)?;
        if !inner.hooks.setup(&remote) {
            return Err(TransferError::CouldNotSetAddress);
        }

        assert!(
            destination.is_open() && !destination.is_read_only(),
            "download destination must be an open, writable file"
        );

        {
            let mut body = lock(&self.body);
            *body = destination;
            body.set_position(false, 0)
                .map_err(|_| TransferError::Unavailable)?;

            let mut request = lock(&self.request);
            request.reset();
            request.verb = Verb::Get;
            request.path.push_str(remote.path());
            request.host.push_str(remote.host_str().unwrap_or_default());
        }

        inner.state = TransferState::Download;
        debug!(url = %remote, "download accepted");
        self.start_transfer(&mut inner)
    }

    /// Total size of the engine's body file in bytes.
    pub fn file_size(&self) -> u64 {
        lock(&self.body).size()
    }

    /// Bytes transferred so far: the body cursor position.
    pub fn transferred_bytes(&self) -> u64 {
        lock(&self.body).position()
    }

    /// Current engine state.
    pub fn state(&self) -> TransferState {
        lock(&self.inner).state
    }

    /// Aborts any in-flight transfer and tears the link down.
    ///
    /// No `transferred` upcall is delivered for a transfer aborted this
    /// way; late channel notifications are ignored.
    pub fn close(&self) {
        // State drops to idle first, under the lock, so notifications
        // arriving while the link tears down find nothing to finish. The
        // blocking close itself runs without the admin lock held: the
        // framing layer may need to deliver a final upcall to complete.
        {
            let mut inner = lock(&self.inner);
            inner.pending_submit = false;
            inner.response = None;
            inner.state = TransferState::Idle;
        }
        self.channel.close(INFINITE);
        self.channel.flush();
    }

    fn start_transfer(&self, inner: &mut Inner<B, H>) -> Result<(), TransferError> {
        debug_assert!(inner.response.is_none());

        if self.channel.is_open() {
            self.channel.submit(self.request.clone());
        } else {
            inner.pending_submit = true;
            if let Err(error) = self.channel.open(0) {
                warn!(%error, "link open failed");
                inner.pending_submit = false;
                inner.state = TransferState::Idle;
                return Err(TransferError::Unavailable);
            }
        }
        Ok(())
    }

    // --- upcalls delivered by the framing layer ---------------------------

    /// Response headers are complete: attach the body sink.
    ///
    /// For a download whose content length is known the cursor is rewound
    /// first, so the streamed bytes land at offset zero; without a content
    /// length the body keeps appending at the current cursor until EOF.
    pub fn link_body(&self, response: &mut Response<B>) {
        let inner = lock(&self.inner);
        if inner.state == TransferState::Download && response.content_length.is_some() {
            let _ = lock(&self.body).set_position(false, 0);
        }
        response.body = Some(self.body.clone());
    }

    /// A complete response has arrived; request the channel teardown that
    /// will deliver the terminal state change.
    pub fn received(&self, response: Response<B>) {
        let mut inner = lock(&self.inner);
        if inner.state == TransferState::Idle {
            return;
        }
        debug!(status = response.status, "response received");
        inner.response = Some(response);
        self.channel.close(0);
    }

    /// The outbound request has been fully transmitted. Observational:
    /// the channel reuses the single in-flight element, so it must be ours.
    pub fn sent(&self, request: &Shared<Request<B>>) {
        debug_assert!(Arc::ptr_eq(request, &self.request));
        let _ = request;
    }

    /// The link opened, closed or was suspended.
    pub fn state_change(&self) {
        let mut inner = lock(&self.inner);
        if self.channel.is_open() {
            if inner.pending_submit {
                inner.pending_submit = false;
                self.channel.submit(self.request.clone());
            }
        } else if inner.response.is_some()
            || self.channel.is_closed()
            || self.channel.is_suspended()
        {
            self.end_transfer(&mut inner);
        }
    }

    fn end_transfer(&self, inner: &mut Inner<B, H>) {
        if inner.state == TransferState::Idle {
            // Closed or never started; late notifications are ignored.
            return;
        }
        let downloading = inner.state == TransferState::Download;

        let result = match inner.response.take() {
            Some(response) => {
                let mut body = lock(&self.body);
                let position = body.position();
                let size = body.size();

                if response.status == STATUS_NOT_FOUND {
                    Err(TransferError::Unavailable)
                } else if response.status == STATUS_OK
                    && downloading
                    && ((position == 0 && size == 0) || size < position)
                {
                    Err(TransferError::WriteError)
                } else if response.status == STATUS_UNAUTHORIZED
                    || (downloading
                        && !I::verify(&mut body, response.content_signature.as_ref()))
                {
                    Err(TransferError::IncorrectHash)
                } else {
                    Ok(())
                }
            }
            None => Err(TransferError::Unavailable),
        };

        inner.state = TransferState::Idle;
        inner.pending_submit = false;

        match &result {
            Ok(()) => info!("transfer complete"),
            Err(error) => warn!(%error, "transfer failed"),
        }

        let body = lock(&self.body);
        inner.hooks.transferred(result, &body);
    }
}

fn parse_remote(url: &str) -> Result<Url, TransferError> {
    let remote = Url::parse(url).map_err(|_| TransferError::IncorrectUrl)?;
    if !matches!(remote.scheme(), "http" | "https") || remote.host_str().is_none() {
        return Err(TransferError::IncorrectUrl);
    }
    Ok(remote)
}
