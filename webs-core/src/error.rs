// Error types for webs-core

use http::StatusCode;
use thiserror::Error;

/// Result type for webs-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Template load error: {0}")]
    TemplateLoad(String),

    #[error("Template render error: {0}")]
    TemplateRender(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status a transport should use when this error ends a request.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::TemplateLoad(_)
            | Error::TemplateRender(_)
            | Error::Serialization(_)
            | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}
