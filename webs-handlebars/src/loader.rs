//! Template loader backed by a directory of Handlebars files

use crate::{config::HandlebarsConfig, error::HandlebarsError, helpers, Result};
use handlebars::Handlebars;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use webs_core::{TemplateData, TemplateLoader, TemplateSet};
use webs_log::{debug, info};

/// A parsed set of Handlebars templates.
pub struct HandlebarsTemplates {
    handlebars: Handlebars<'static>,
}

impl HandlebarsTemplates {
    /// Parse every template file in the configured directory.
    ///
    /// Each file `<name><extension>` registers a template called `<name>`.
    /// Fails if the directory cannot be read, holds no templates, or any
    /// template does not parse.
    pub fn parse(config: &HandlebarsConfig) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(config.strict_mode);
        if !config.escape_html {
            handlebars.register_escape_fn(handlebars::no_escape);
        }
        helpers::register_builtin_helpers(&mut handlebars);

        let files = template_files(config)?;
        if files.is_empty() {
            return Err(HandlebarsError::ConfigError(format!(
                "no templates matching {}/*{}",
                config.template_dir.display(),
                config.template_extension
            )));
        }

        for (name, path) in &files {
            let source = fs::read_to_string(path)?;
            handlebars
                .register_template_string(name, source)
                .map_err(|e| HandlebarsError::ParseError(format!("{}: {}", path.display(), e)))?;
        }
        debug!(target: "webs::templates", "parsed {} templates from {:?}", files.len(), config.template_dir);

        Ok(Self { handlebars })
    }

    /// Names of all registered templates, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlebars.get_templates().keys().cloned().collect();
        names.sort();
        names
    }
}

impl TemplateSet for HandlebarsTemplates {
    fn render(&self, name: &str, data: &TemplateData, out: &mut dyn Write) -> webs_core::Result<()> {
        self.handlebars
            .render_to_write(name, data, out)
            .map_err(|e| HandlebarsError::from(e).into())
    }

    fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }
}

/// `(name, path)` of each template file, sorted by name.
fn template_files(config: &HandlebarsConfig) -> Result<Vec<(String, PathBuf)>> {
    if !config.template_dir.is_dir() {
        return Err(HandlebarsError::ConfigError(format!(
            "Template directory not found: {:?}",
            config.template_dir
        )));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(&config.template_dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(config.bare_extension()) {
            continue;
        }
        if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
            files.push((name.to_string(), path.clone()));
        }
    }
    files.sort();
    Ok(files)
}

/// Loads [`HandlebarsTemplates`] from a directory.
///
/// Without `reload` the templates are parsed once, when the loader is
/// created, and every load returns that set. With `reload` each load
/// parses the directory again so edits show up without a restart.
///
/// ```no_run
/// use webs_handlebars::{HandlebarsConfig, HandlebarsTemplateLoader};
///
/// let loader = HandlebarsTemplateLoader::new(HandlebarsConfig::new("templates"))?;
/// # Ok::<(), webs_handlebars::HandlebarsError>(())
/// ```
pub struct HandlebarsTemplateLoader {
    config: HandlebarsConfig,
    cached: Option<Arc<HandlebarsTemplates>>,
}

impl HandlebarsTemplateLoader {
    pub fn new(config: HandlebarsConfig) -> Result<Self> {
        let cached = if config.reload {
            None
        } else {
            let templates = HandlebarsTemplates::parse(&config)?;
            info!(target: "webs::templates", "loaded templates {:?}", templates.names());
            Some(Arc::new(templates))
        };
        Ok(Self { config, cached })
    }

    /// Get configuration
    pub fn config(&self) -> &HandlebarsConfig {
        &self.config
    }
}

impl TemplateLoader for HandlebarsTemplateLoader {
    fn load(&self) -> webs_core::Result<Arc<dyn TemplateSet>> {
        if let Some(cached) = &self.cached {
            return Ok(cached.clone());
        }
        let templates = HandlebarsTemplates::parse(&self.config)?;
        Ok(Arc::new(templates))
    }
}

impl std::fmt::Debug for HandlebarsTemplateLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlebarsTemplateLoader")
            .field("config", &self.config)
            .field("cached", &self.cached.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_templates() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("test.hbs"), "<h1>Hello {{name}}!</h1>").unwrap();
        fs::write(
            temp_dir.path().join("list.hbs"),
            "{{#each items}}<li>{{this}}</li>{{/each}}",
        )
        .unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "not a template").unwrap();
        temp_dir
    }

    fn render(set: &dyn TemplateSet, name: &str, data: serde_json::Value) -> webs_core::Result<String> {
        let data = match data {
            serde_json::Value::Object(map) => map,
            _ => TemplateData::new(),
        };
        let mut out = Vec::new();
        set.render(name, &data, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_loader_names_templates_by_stem() {
        let dir = create_test_templates();
        let loader = HandlebarsTemplateLoader::new(HandlebarsConfig::new(dir.path())).unwrap();
        let set = loader.load().unwrap();

        assert!(set.has_template("test"));
        assert!(set.has_template("list"));
        assert!(!set.has_template("notes"));
    }

    #[test]
    fn test_render() {
        let dir = create_test_templates();
        let loader = HandlebarsTemplateLoader::new(HandlebarsConfig::new(dir.path())).unwrap();
        let set = loader.load().unwrap();

        assert_eq!(
            render(set.as_ref(), "test", json!({"name": "World"})).unwrap(),
            "<h1>Hello World!</h1>"
        );
        assert_eq!(
            render(set.as_ref(), "list", json!({"items": [1, 2]})).unwrap(),
            "<li>1</li><li>2</li>"
        );
    }

    #[test]
    fn test_render_escapes_html() {
        let dir = create_test_templates();
        let loader = HandlebarsTemplateLoader::new(HandlebarsConfig::new(dir.path())).unwrap();
        let set = loader.load().unwrap();
        assert_eq!(
            render(set.as_ref(), "test", json!({"name": "<script>"})).unwrap(),
            "<h1>Hello &lt;script&gt;!</h1>"
        );
    }

    #[test]
    fn test_unknown_template_is_render_error() {
        let dir = create_test_templates();
        let loader = HandlebarsTemplateLoader::new(HandlebarsConfig::new(dir.path())).unwrap();
        let err = render(loader.load().unwrap().as_ref(), "missing", json!({})).unwrap_err();
        assert!(matches!(err, webs_core::Error::TemplateRender(_)));
    }

    #[test]
    fn test_cached_set_ignores_edits() {
        let dir = create_test_templates();
        let loader = HandlebarsTemplateLoader::new(HandlebarsConfig::new(dir.path())).unwrap();
        fs::write(dir.path().join("test.hbs"), "changed").unwrap();

        let first = loader.load().unwrap();
        let second = loader.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(render(first.as_ref(), "test", json!({"name": "A"})).unwrap(), "<h1>Hello A!</h1>");
    }

    #[test]
    fn test_reload_picks_up_edits() {
        let dir = create_test_templates();
        let config = HandlebarsConfig::new(dir.path()).with_reload(true);
        let loader = HandlebarsTemplateLoader::new(config).unwrap();

        assert_eq!(render(loader.load().unwrap().as_ref(), "test", json!({"name": "A"})).unwrap(), "<h1>Hello A!</h1>");
        fs::write(dir.path().join("test.hbs"), "<p>{{name}}</p>").unwrap();
        assert_eq!(render(loader.load().unwrap().as_ref(), "test", json!({"name": "A"})).unwrap(), "<p>A</p>");
    }

    #[test]
    fn test_parse_error_fails_construction() {
        let dir = create_test_templates();
        fs::write(dir.path().join("broken.hbs"), "{{#if ready}}never closed").unwrap();

        let err = HandlebarsTemplateLoader::new(HandlebarsConfig::new(dir.path())).unwrap_err();
        assert!(matches!(&err, HandlebarsError::ParseError(message) if message.contains("broken.hbs")));
    }

    #[test]
    fn test_reload_reports_parse_error_on_load() {
        let dir = create_test_templates();
        let loader = HandlebarsTemplateLoader::new(HandlebarsConfig::new(dir.path()).with_reload(true)).unwrap();
        fs::write(dir.path().join("broken.hbs"), "{{#each items}}never closed").unwrap();

        let err = loader.load().err().unwrap();
        assert!(matches!(err, webs_core::Error::TemplateLoad(_)));
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = HandlebarsTemplateLoader::new(HandlebarsConfig::new(dir.path().join("nope"))).unwrap_err();
        assert!(matches!(err, HandlebarsError::ConfigError(_)));
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let err = HandlebarsTemplateLoader::new(HandlebarsConfig::new(dir.path())).unwrap_err();
        assert!(matches!(err, HandlebarsError::ConfigError(_)));
    }

    #[test]
    fn test_strict_mode() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("strict.hbs"), "{{missing}}").unwrap();
        let loader = HandlebarsTemplateLoader::new(HandlebarsConfig::new(dir.path()).with_strict_mode(true)).unwrap();

        assert!(render(loader.load().unwrap().as_ref(), "strict", json!({})).is_err());
    }
}
