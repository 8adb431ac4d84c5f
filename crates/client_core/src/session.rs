//! Session lookup: the `"user"` entry written by the login flow, read through
//! an injected [`SessionStore`].

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use shared::domain::{Session, SESSION_USER_KEY};
use thiserror::Error;
use tracing::warn;

use crate::SessionStore;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to access session file '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("session file '{path}' is not a JSON object of strings: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode session entry: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Parses the current user's session, if one was stored.
pub fn read_session(store: &dyn SessionStore) -> Option<Session> {
    let raw = store.get_item(SESSION_USER_KEY)?;
    match serde_json::from_str::<Session>(&raw) {
        Ok(session) => Some(session),
        Err(err) => {
            warn!(error = %err, "ignoring malformed session entry");
            None
        }
    }
}

/// Email of the signed-in user, if any.
pub fn session_email(store: &dyn SessionStore) -> Option<String> {
    read_session(store).and_then(|session| session.email)
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: &Session) -> Result<Self, SessionError> {
        let store = Self::new();
        store.set_session(session)?;
        Ok(store)
    }

    pub fn set_item(&self, key: &str, value: impl Into<String>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.into());
    }

    pub fn set_session(&self, session: &Session) -> Result<(), SessionError> {
        self.set_item(SESSION_USER_KEY, serde_json::to_string(session)?);
        Ok(())
    }
}

impl SessionStore for MemorySessionStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

/// Key-value entries persisted as one JSON object on disk. Every read goes
/// back to the file so it always reflects the latest write.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| SessionError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SessionError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let encoded = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, encoded).map_err(|source| SessionError::Io {
            path: self.path.clone(),
            source,
        })
    }

    pub fn set_item(&self, key: &str, value: impl Into<String>) -> Result<(), SessionError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.into());
        self.save(&entries)
    }

    pub fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }

    pub fn set_session(&self, session: &Session) -> Result<(), SessionError> {
        self.set_item(SESSION_USER_KEY, serde_json::to_string(session)?)
    }
}

impl SessionStore for FileSessionStore {
    fn get_item(&self, key: &str) -> Option<String> {
        match self.load() {
            Ok(mut entries) => entries.remove(key),
            Err(err) => {
                warn!(error = %err, "session store unreadable");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
