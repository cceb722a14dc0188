//! JSON-file backed session storage.
//!
//! The whole mapping lives in memory and is mirrored to a single JSON file:
//!
//! ```json
//! {"3f2a...": {"name": "Alice"}}
//! ```
//!
//! Every successful `save` or `delete` rewrites the complete file before it
//! returns. The rewrite goes to a temporary file in the same directory which
//! is synced and then renamed over the target, so readers only ever see a
//! complete old or complete new file.

use crate::error::{SessionError, SessionResult};
use crate::memory::sorted_by_id;
use crate::traits::{Session, SessionStore};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use webs_log::{debug, error, warn};

type PersistedSessions = BTreeMap<String, BTreeMap<String, String>>;

/// Session store persisted to a JSON file.
///
/// # Examples
///
/// ```no_run
/// use webs_session::{FileSessionStore, Session, SessionStore};
///
/// let store = FileSessionStore::open("sessions.json")?;
/// store.save(&Session::generate().with_value("name", "Alice"))?;
/// # Ok::<(), webs_session::SessionError>(())
/// ```
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    sessions: Mutex<HashMap<String, Session>>,
}

impl FileSessionStore {
    /// Open the store at `path`.
    ///
    /// A missing file, or one holding just `null`, yields an empty store.
    /// A file that is not a JSON object of string maps fails with
    /// [`SessionError::Construction`].
    pub fn open(path: impl Into<PathBuf>) -> SessionResult<Self> {
        let path = path.into();
        let sessions = load(&path)?;
        debug!(target: "webs::session", "loaded {} sessions from {:?}", sessions.len(), path);

        Ok(Self {
            path,
            sessions: Mutex::new(sessions),
        })
    }

    /// The file this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, sessions: &HashMap<String, Session>) -> SessionResult<()> {
        let snapshot: BTreeMap<&str, &BTreeMap<String, String>> = sessions
            .iter()
            .map(|(id, session)| (id.as_str(), session.values()))
            .collect();
        let data = serde_json::to_vec(&snapshot)
            .map_err(|e| SessionError::Serialization(e.to_string()))?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!(target: "webs::session", "wrote {} sessions to {:?}", sessions.len(), self.path);
        Ok(())
    }
}

fn load(path: &Path) -> SessionResult<HashMap<String, Session>> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => return Err(e.into()),
    };

    // `null` is an empty store
    let persisted: PersistedSessions = serde_json::from_slice::<Option<PersistedSessions>>(&data)
        .map_err(|e| SessionError::Construction {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .unwrap_or_default();

    let mut sessions = HashMap::with_capacity(persisted.len());
    for (id, values) in persisted {
        if id.is_empty() {
            warn!(target: "webs::session", "ignoring session with empty id in {:?}", path);
            continue;
        }
        sessions.insert(id.clone(), Session::from_parts(id, values));
    }
    Ok(sessions)
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &Session) -> SessionResult<()> {
        if session.is_zero() {
            return Ok(());
        }
        let mut sessions = self.sessions.lock();
        let previous = sessions.insert(session.id().to_string(), session.clone());

        if let Err(e) = self.persist(&sessions) {
            error!(target: "webs::session", "cannot persist session {}: {}", session.id(), e);
            // keep memory in line with what is on disk
            match previous {
                Some(previous) => sessions.insert(session.id().to_string(), previous),
                None => sessions.remove(session.id()),
            };
            return Err(e);
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> SessionResult<()> {
        let mut sessions = self.sessions.lock();
        let Some(previous) = sessions.remove(id) else {
            return Ok(());
        };

        if let Err(e) = self.persist(&sessions) {
            error!(target: "webs::session", "cannot persist deletion of {}: {}", id, e);
            sessions.insert(id.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }

    fn find(&self, id: &str) -> Session {
        self.sessions.lock().get(id).cloned().unwrap_or_default()
    }

    fn find_all(&self) -> Vec<Session> {
        sorted_by_id(self.sessions.lock().values().cloned().collect())
    }
}
