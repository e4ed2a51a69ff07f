//! Session token storage.
//!
//! Tokens are kept under the keys `authToken` and `refreshToken`. Stores are
//! shared between concurrent requests, so they synchronize internally.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use avatarkit_core::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

use crate::error::ClientError;

/// Key/value token storage injected into the client.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;

    /// Remove every stored token.
    fn clear(&self) -> Result<(), ClientError>;
}

/// Snapshot of the tokens held by a [`SessionStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl AuthSession {
    pub fn load(store: &dyn SessionStore) -> Self {
        Self {
            access_token: store.get(ACCESS_TOKEN_KEY),
            refresh_token: store.get(REFRESH_TOKEN_KEY),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

fn lock_poisoned() -> ClientError {
    ClientError::Session("session store lock poisoned".to_string())
}

/// In-process store; tokens live as long as the store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.values
            .write()
            .map_err(|_| lock_poisoned())?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.values.write().map_err(|_| lock_poisoned())?.clear();
        Ok(())
    }
}

/// Store backed by a JSON object on disk, so a session survives between CLI runs.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl FileSessionStore {
    /// Open the store at `path`. A missing file is an empty session.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let values = match fs::read(&path) {
            Ok(raw) if raw.is_empty() => HashMap::new(),
            Ok(raw) => serde_json::from_slice(&raw)?,
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &HashMap<String, String>) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_vec_pretty(values)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let mut values = self.values.write().map_err(|_| lock_poisoned())?;
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn clear(&self) -> Result<(), ClientError> {
        let mut values = self.values.write().map_err(|_| lock_poisoned())?;
        values.clear();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            // tokens must not survive on disk: overwrite with an empty session
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove session file");
                self.persist(&values)
            }
        }
    }
}
