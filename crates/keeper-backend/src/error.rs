//! # Backend Error Types
//!
//! Errors from the HTTP collaborators. The taxonomy mirrors how callers
//! react: request failures surface for retry-by-reattempt, decode
//! failures indicate a contract break, and the notifier channel closing
//! means shutdown.

use thiserror::Error;

/// HTTP collaborator errors.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request itself failed (connect, timeout, TLS).
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The collaborator answered with a non-success status.
    #[error("Unexpected status {status} from {endpoint}")]
    UnexpectedStatus { endpoint: String, status: u16 },

    /// The response body didn't match the wire contract.
    #[error("Response decode failed: {0}")]
    Decode(String),

    /// The notifier queue is gone (worker shut down).
    #[error("Notifier channel closed")]
    ChannelClosed,
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
