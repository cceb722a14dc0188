//! Session store configuration.

use crate::error::SessionResult;
use crate::file::FileSessionStore;
use crate::memory::MemorySessionStore;
use crate::traits::SessionStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Session backend type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionBackend {
    /// Process memory only
    Memory,
    /// Memory mirrored to a JSON file
    File(PathBuf),
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Backend type
    pub backend: SessionBackend,
    /// Name of the cookie that carries the session id
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::Memory,
            cookie_name: "SESSION_ID".to_string(),
        }
    }
}

impl SessionConfig {
    /// In-memory configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use webs_session::{SessionBackend, SessionConfig};
    ///
    /// let config = SessionConfig::memory();
    /// assert_eq!(config.backend, SessionBackend::Memory);
    /// ```
    pub fn memory() -> Self {
        Self::default()
    }

    /// File-backed configuration persisting to `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: SessionBackend::File(path.into()),
            ..Default::default()
        }
    }

    /// Set the session cookie name.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Build the configured store.
    ///
    /// Only the file backend can fail, when its file exists but is unreadable
    /// or malformed.
    pub fn open(&self) -> SessionResult<Arc<dyn SessionStore>> {
        Ok(match &self.backend {
            SessionBackend::Memory => Arc::new(MemorySessionStore::new()),
            SessionBackend::File(path) => Arc::new(FileSessionStore::open(path.clone())?),
        })
    }
}
