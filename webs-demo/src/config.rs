//! Demo server configuration, read from `WEBS_*` environment variables.
//!
//! | Variable                | Default          |
//! |-------------------------|------------------|
//! | `WEBS_ADDR`             | `127.0.0.1:8080` |
//! | `WEBS_TEMPLATES`        | `templates`      |
//! | `WEBS_STATIC`           | `static`         |
//! | `WEBS_TEMPLATE_RELOAD`  | `false`          |
//! | `WEBS_SESSION_FILE`     | unset (memory)   |
//!
//! A `.env` file in the working directory is read first when present.

use crate::error::{DemoError, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use webs_handlebars::HandlebarsConfig;
use webs_session::SessionConfig;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "SAMPLE_SESSION_ID";

const ENV_PREFIX: &str = "WEBS";

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub addr: SocketAddr,
    pub templates: HandlebarsConfig,
    pub static_dir: PathBuf,
    pub session: SessionConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            templates: HandlebarsConfig::new("templates"),
            static_dir: PathBuf::from("static"),
            session: SessionConfig::memory().with_cookie_name(SESSION_COOKIE),
        }
    }
}

impl DemoConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Ignore if .env doesn't exist
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from `lookup`, which maps a full variable name
    /// such as `WEBS_ADDR` to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(&format!("{}_{}", ENV_PREFIX, key)).filter(|value| !value.trim().is_empty())
        };
        let mut config = Self::default();

        if let Some(addr) = var("ADDR") {
            config.addr = addr
                .trim()
                .parse()
                .map_err(|e| DemoError::Config(format!("{}_ADDR={:?}: {}", ENV_PREFIX, addr, e)))?;
        }
        if let Some(dir) = var("TEMPLATES") {
            config.templates.template_dir = PathBuf::from(dir);
        }
        if let Some(reload) = var("TEMPLATE_RELOAD") {
            config.templates.reload = parse_bool(&reload).ok_or_else(|| {
                DemoError::Config(format!("{}_TEMPLATE_RELOAD={:?}: expected a boolean", ENV_PREFIX, reload))
            })?;
        }
        if let Some(dir) = var("STATIC") {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(path) = var("SESSION_FILE") {
            config.session = SessionConfig::file(path).with_cookie_name(SESSION_COOKIE);
        }

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
