//! Configuration for the Handlebars template loader

use std::path::PathBuf;

/// Configuration for the Handlebars template loader
#[derive(Debug, Clone)]
pub struct HandlebarsConfig {
    /// Directory containing template files
    pub template_dir: PathBuf,

    /// Template file extension (default: ".hbs")
    pub template_extension: String,

    /// Re-parse the templates on every load instead of caching them
    pub reload: bool,

    /// Enable strict mode (error on missing variables)
    pub strict_mode: bool,

    /// Enable HTML escaping (default: true)
    pub escape_html: bool,
}

impl HandlebarsConfig {
    /// Create a new configuration with template directory
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: template_dir.into(),
            template_extension: ".hbs".to_string(),
            reload: false,
            strict_mode: false,
            escape_html: true,
        }
    }

    /// Set template file extension
    pub fn with_extension(mut self, ext: impl Into<String>) -> Self {
        self.template_extension = ext.into();
        self
    }

    /// Re-parse templates on every load (useful while editing them)
    pub fn with_reload(mut self, enable: bool) -> Self {
        self.reload = enable;
        self
    }

    /// Enable strict mode (error on missing variables)
    pub fn with_strict_mode(mut self, enable: bool) -> Self {
        self.strict_mode = enable;
        self
    }

    /// Enable/disable HTML escaping
    pub fn with_escape_html(mut self, enable: bool) -> Self {
        self.escape_html = enable;
        self
    }

    /// The extension without its leading dot.
    pub(crate) fn bare_extension(&self) -> &str {
        self.template_extension.trim_start_matches('.')
    }
}

impl Default for HandlebarsConfig {
    fn default() -> Self {
        Self::new("templates")
    }
}
