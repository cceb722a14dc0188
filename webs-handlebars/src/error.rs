//! Error types for the Handlebars loader

use thiserror::Error;

/// Result type for Handlebars operations
pub type Result<T> = std::result::Result<T, HandlebarsError>;

/// Errors that can occur when loading or rendering Handlebars templates
#[derive(Error, Debug)]
pub enum HandlebarsError {
    /// Template rendering error
    #[error("Template rendering error: {0}")]
    RenderError(String),

    /// Template parsing error
    #[error("Template parsing error: {0}")]
    ParseError(String),

    /// IO error when loading templates
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<handlebars::RenderError> for HandlebarsError {
    fn from(err: handlebars::RenderError) -> Self {
        HandlebarsError::RenderError(err.to_string())
    }
}

impl From<HandlebarsError> for webs_core::Error {
    fn from(err: HandlebarsError) -> Self {
        match err {
            HandlebarsError::RenderError(_) => webs_core::Error::TemplateRender(err.to_string()),
            HandlebarsError::ParseError(_)
            | HandlebarsError::Io(_)
            | HandlebarsError::ConfigError(_) => webs_core::Error::TemplateLoad(err.to_string()),
        }
    }
}
