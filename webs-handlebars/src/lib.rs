//! Handlebars templates for webs
//!
//! [`HandlebarsTemplateLoader`] implements [`webs_core::TemplateLoader`] over a
//! directory of `.hbs` files. Each file becomes a template named after the
//! file without its extension, so `templates/index.hbs` renders with
//! `Response::template("index", data)`.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use webs_core::ResponseRenderer;
//! use webs_handlebars::{HandlebarsConfig, HandlebarsTemplateLoader};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HandlebarsConfig::new("templates")
//!     .with_extension(".hbs")
//!     .with_reload(cfg!(debug_assertions));
//!
//! let loader = HandlebarsTemplateLoader::new(config)?;
//! let renderer = ResponseRenderer::new(Arc::new(loader));
//! # Ok(())
//! # }
//! ```
//!
//! ## Built-in Helpers
//!
//! - `eq`: `{{#if (eq a b)}}`
//! - `default`: `{{default name "stranger"}}`
//! - `upper`: `{{upper message}}`

pub mod config;
pub mod error;
pub mod helpers;
pub mod loader;

pub use config::HandlebarsConfig;
pub use error::{HandlebarsError, Result};
pub use loader::{HandlebarsTemplateLoader, HandlebarsTemplates};
