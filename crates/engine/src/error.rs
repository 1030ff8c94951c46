//! Client-visible transfer failures.

/// Failure kinds surfaced by the engines, either as the immediate result
/// of `upload`/`download` or through the terminal `transferred` upcall.
///
/// Transport-level failures (a link that cannot open, a suspended link)
/// are mapped into [`TransferError::Unavailable`] rather than surfaced;
/// signature mismatches and 401 replies are conflated into a single trust
/// failure, [`TransferError::IncorrectHash`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    /// The engine already owns an active transfer.
    #[error("a transfer is already in progress")]
    InProgress,

    /// The URL failed structural validation.
    #[error("incorrect url")]
    IncorrectUrl,

    /// The transport setup hook rejected the URL.
    #[error("could not set the remote address")]
    CouldNotSetAddress,

    /// No response arrived, or the remote reported 404.
    #[error("remote peer or file unavailable")]
    Unavailable,

    /// A download completed with fewer bytes than advertised.
    #[error("bytes written do not match the advertised length")]
    WriteError,

    /// Content signature mismatch, or the remote returned 401.
    #[error("content signature rejected")]
    IncorrectHash,
}
