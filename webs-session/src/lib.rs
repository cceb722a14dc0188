//! Session storage for webs applications.
//!
//! A [`Session`] is an immutable key/value record with a random id. Stores
//! hand out copies; changing a session means building a new value with
//! [`Session::with_value`] and saving it.
//!
//! # Backends
//!
//! - [`MemorySessionStore`] - process memory, never fails
//! - [`FileSessionStore`] - memory mirrored to a JSON file that is fully
//!   rewritten on every change
//!
//! # Example
//!
//! ```
//! use webs_session::prelude::*;
//!
//! fn remember_name(store: &dyn SessionStore, id: &str, name: &str) -> SessionResult<Session> {
//!     let mut session = store.find(id);
//!     if session.is_zero() {
//!         session = Session::generate();
//!     }
//!     let session = session.with_value("name", name);
//!     store.save(&session)?;
//!     Ok(session)
//! }
//!
//! let store = MemorySessionStore::new();
//! let session = remember_name(&store, "", "Alice").unwrap();
//! assert_eq!(store.find(session.id()).get("name", ""), "Alice");
//! ```

pub mod config;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use config::{SessionBackend, SessionConfig};
pub use error::{SessionError, SessionResult};
pub use file::FileSessionStore;
pub use memory::MemorySessionStore;
pub use traits::{Session, SessionStore, generate_session_id};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{SessionBackend, SessionConfig};
    pub use crate::error::{SessionError, SessionResult};
    pub use crate::file::FileSessionStore;
    pub use crate::memory::MemorySessionStore;
    pub use crate::traits::{Session, SessionStore, generate_session_id};
}
