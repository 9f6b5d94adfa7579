//! Error types for annex-remote
//!
//! Two channels are kept apart:
//! - [`AnnexError`] is fatal. It ends the session with a single `ERROR` line.
//! - [`RemoteError`] is the outcome of one backend operation. The dispatcher
//!   turns it into a `-FAILURE` reply or `UNSUPPORTED-REQUEST` and carries on.

use thiserror::Error;

/// Result type alias using AnnexError
pub type Result<T> = std::result::Result<T, AnnexError>;

/// Result type returned by backend operations
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Structural errors that terminate the protocol session
#[derive(Debug, Error)]
pub enum AnnexError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Wire Errors
    // -------------------------------------------------------------------------
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Unexpected message: expected {expected}, got '{got}'")]
    UnexpectedMessage { expected: String, got: String },

    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    // -------------------------------------------------------------------------
    // Backend Errors
    // -------------------------------------------------------------------------
    /// A backend failed on a request that has no failure reply
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Outcome of a backend operation that did not succeed
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The operation was attempted and failed; the message goes on the wire
    #[error("{0}")]
    Failed(String),

    /// The backend does not implement this operation
    #[error("unsupported request")]
    Unsupported,

    /// A structural error raised while the backend was running
    #[error(transparent)]
    Fatal(#[from] AnnexError),
}

impl RemoteError {
    /// Create a business failure carrying `message`
    pub fn failed(message: impl Into<String>) -> Self {
        RemoteError::Failed(message.into())
    }
}

impl From<std::io::Error> for RemoteError {
    fn from(err: std::io::Error) -> Self {
        RemoteError::Failed(err.to_string())
    }
}
