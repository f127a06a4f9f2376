use thiserror::Error;

/// Local, pre-submission failures. These block the submit action in place and
/// never travel through a request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("file exceeds the 16 MiB upload limit")]
    TooLarge,
    #[error("only CSV files are accepted")]
    WrongType,
    #[error("select at least one product first")]
    EmptySelection,
    #[error("sales and products files must both be staged")]
    MissingRequiredFiles,
    #[error("unsupported planning window: {0} days")]
    InvalidHorizon(u32),
}

/// Failures delivered by (or on the way to) the remote planning service.
/// Every variant resolves the owning lifecycle to `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("request timed out")]
    Timeout,
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("{0}")]
    NotFound(String),
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound(_))
    }
}

/// Reasons a workflow refuses to start a request at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a request is already in flight for this workflow")]
    AlreadyInFlight,
}
