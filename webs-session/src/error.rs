//! Error types for session operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session store errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The persisted session file exists but cannot be decoded
    #[error("Malformed session file {path:?}: {message}")]
    Construction { path: PathBuf, message: String },

    /// Reading or rewriting the session file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The session mapping could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SessionError {
    /// Whether the error came from the storage medium rather than from bad data.
    pub fn is_io(&self) -> bool {
        matches!(self, SessionError::Io(_))
    }
}
