//! Session value and the store trait shared by every backend.

use crate::error::SessionResult;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A user session.
///
/// Sessions are values: [`Session::with_value`] returns a new session and
/// leaves the receiver untouched, so a session handed out by a store never
/// changes behind the caller's back. The map sits behind an [`Arc`] which
/// makes cloning cheap; every write allocates a fresh map.
///
/// A session with an empty id is the *zero session*. It means "no session",
/// is returned by lookups that miss, and is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    id: String,
    values: Arc<BTreeMap<String, String>>,
}

impl Session {
    /// Create an empty session with a fresh random id.
    pub fn generate() -> Self {
        Self::with_id(generate_session_id())
    }

    /// Create an empty session with the given id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: Arc::default(),
        }
    }

    pub(crate) fn from_parts(id: String, values: BTreeMap<String, String>) -> Self {
        Self {
            id,
            values: Arc::new(values),
        }
    }

    /// Whether this is the zero session (empty id).
    pub fn is_zero(&self) -> bool {
        self.id.is_empty()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Return a copy of this session with `key` set to `value`.
    #[must_use]
    pub fn with_value(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut values = BTreeMap::clone(&self.values);
        values.insert(key.into(), value.into());
        Self {
            id: self.id.clone(),
            values: Arc::new(values),
        }
    }

    /// Return a copy of this session without `key`.
    #[must_use]
    pub fn without_value(&self, key: &str) -> Self {
        if !self.values.contains_key(key) {
            return self.clone();
        }
        let mut values = BTreeMap::clone(&self.values);
        values.remove(key);
        Self {
            id: self.id.clone(),
            values: Arc::new(values),
        }
    }

    /// Value stored under `key`, or `default` when absent.
    pub fn get<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.values.get(key).map(String::as_str).unwrap_or(default)
    }

    /// All keys in lexicographic order.
    pub fn keys(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

/// Session storage backend.
///
/// Every method takes the store's lock for its full duration, so calls on
/// one store are linearizable. Nothing is coordinated across stores.
///
/// # Examples
///
/// ```
/// use webs_session::{MemorySessionStore, Session, SessionStore};
///
/// let store = MemorySessionStore::new();
/// let session = Session::generate().with_value("name", "Alice");
/// store.save(&session).unwrap();
///
/// let found = store.find(session.id());
/// assert_eq!(found.get("name", ""), "Alice");
/// assert!(store.find("missing").is_zero());
/// ```
pub trait SessionStore: Send + Sync {
    /// Insert or replace `session`. Saving the zero session does nothing.
    fn save(&self, session: &Session) -> SessionResult<()>;

    /// Remove the session with `id`. Unknown ids are not an error.
    fn delete(&self, id: &str) -> SessionResult<()>;

    /// The stored session for `id`, or the zero session.
    fn find(&self, id: &str) -> Session;

    /// Every stored session, ordered by id.
    fn find_all(&self) -> Vec<Session>;
}

/// Generate a new session id: 32 lowercase hex characters, 128 random bits.
///
/// Ids come from the thread-local generator of `rand`. They are meant to be
/// unique, not to serve as bearer credentials.
pub fn generate_session_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}
