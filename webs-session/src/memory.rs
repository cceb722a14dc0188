//! In-memory session storage.

use crate::error::SessionResult;
use crate::traits::{Session, SessionStore};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Session store that keeps everything in process memory.
///
/// Never fails; all data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &Session) -> SessionResult<()> {
        if session.is_zero() {
            return Ok(());
        }
        self.sessions
            .lock()
            .insert(session.id().to_string(), session.clone());
        Ok(())
    }

    fn delete(&self, id: &str) -> SessionResult<()> {
        self.sessions.lock().remove(id);
        Ok(())
    }

    fn find(&self, id: &str) -> Session {
        self.sessions.lock().get(id).cloned().unwrap_or_default()
    }

    fn find_all(&self) -> Vec<Session> {
        sorted_by_id(self.sessions.lock().values().cloned().collect())
    }
}

pub(crate) fn sorted_by_id(mut sessions: Vec<Session>) -> Vec<Session> {
    sessions.sort_by(|a, b| a.id().cmp(b.id()));
    sessions
}
