//! Template loading contracts used by the renderer.

use crate::error::{Error, Result};
use crate::response::TemplateData;
use std::io::Write;
use std::sync::Arc;

/// A compiled set of named templates.
pub trait TemplateSet: Send + Sync {
    /// Execute template `name` with `data`, writing output to `out` as it is produced.
    ///
    /// On failure `out` may already hold part of the output.
    fn render(&self, name: &str, data: &TemplateData, out: &mut dyn Write) -> Result<()>;

    /// Check if a template exists
    fn has_template(&self, name: &str) -> bool;
}

/// Source of the compiled template set.
///
/// Implementations may cache the set or rebuild it on every call. Errors
/// are reported to the client as a 500 and never retried.
pub trait TemplateLoader: Send + Sync {
    fn load(&self) -> Result<Arc<dyn TemplateSet>>;
}

/// A loader for apps that never render templates. Every load fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTemplateLoader;

impl NullTemplateLoader {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateLoader for NullTemplateLoader {
    fn load(&self) -> Result<Arc<dyn TemplateSet>> {
        Err(Error::TemplateLoad(
            "NullTemplateLoader cannot load anything".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_loader_fails() {
        let err = NullTemplateLoader::new().load().err().unwrap();
        assert!(matches!(err, Error::TemplateLoad(_)));
    }
}
