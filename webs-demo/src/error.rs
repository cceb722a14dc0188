// Error types for the demo server

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemoError>;

#[derive(Error, Debug)]
pub enum DemoError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Session store error: {0}")]
    Session(#[from] webs_session::SessionError),

    #[error("Template error: {0}")]
    Templates(#[from] webs_handlebars::HandlebarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
