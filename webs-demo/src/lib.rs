//! Sample webs application.
//!
//! Three pages show the pieces working together:
//!
//! - `/` asks for a name and remembers it in a session
//! - `/say?message=...` echoes a query parameter
//! - `/add` sums two posted numbers
//!
//! Files below `static/` are served under `/static/`.

pub mod app;
pub mod config;
pub mod error;
pub mod server;

pub use app::{App, Route};
pub use config::{DemoConfig, SESSION_COOKIE};
pub use error::{DemoError, Result};

use std::sync::Arc;
use webs_core::ResponseRenderer;
use webs_handlebars::HandlebarsTemplateLoader;

/// Open the session store and templates named by `config`.
pub fn build_app(config: &DemoConfig) -> Result<App> {
    let templates = HandlebarsTemplateLoader::new(config.templates.clone())?;
    let sessions = config.session.open()?;
    Ok(App::new(
        ResponseRenderer::new(Arc::new(templates)),
        sessions,
        config.session.cookie_name.clone(),
        config.static_dir.clone(),
    ))
}
