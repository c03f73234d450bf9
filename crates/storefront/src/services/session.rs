//! Durable session persistence.
//!
//! The [`SessionStore`] is the only place that touches persisted credentials.
//! Reads fail soft: any storage problem is logged and treated as "logged out".
//! Writes and removals cover the token and user record in one storage
//! operation, so a reader never sees one without the other.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::AuthUser;
use crate::models::session::{Session, keys};

/// File name of the session record inside the state directory.
const SESSION_FILE: &str = "session.json";

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stored data is not valid JSON of the expected shape.
    #[error("corrupted session data: {0}")]
    Corrupted(#[from] serde_json::Error),
}

/// String key-value storage that survives process restarts.
///
/// Multi-key operations must be all-or-nothing from a reader's perspective.
pub trait SessionStorage: Send + Sync {
    /// Read one key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or is corrupted.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write every pair in one operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError>;

    /// Remove every key in one operation. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError>;
}

// =============================================================================
// SessionStore
// =============================================================================

/// Accessor/mutator pair around persisted session state.
///
/// Cheap to clone; clones share the same backend.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    /// Wrap a storage backend.
    #[must_use]
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    /// Persist `session`, replacing any prior one.
    ///
    /// # Errors
    ///
    /// Returns an error if the user record cannot be encoded or the backend
    /// cannot be written.
    pub fn persist(&self, session: &Session) -> Result<(), StorageError> {
        let user = serde_json::to_string(&session.user)?;
        self.storage.set_all(&[
            (keys::TOKEN, session.expose_token()),
            (keys::USER, &user),
        ])?;
        debug!(user_id = %session.user.id, "Session persisted");
        Ok(())
    }

    /// The persisted user, or `None` if there is no usable session.
    ///
    /// Never fails: unreadable or corrupted storage counts as logged out.
    #[must_use]
    pub fn current_user(&self) -> Option<AuthUser> {
        match self.read_user() {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable session");
                None
            }
        }
    }

    /// The persisted bearer token, if any. Fails soft like [`Self::current_user`].
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        match self.storage.get(keys::TOKEN) {
            Ok(token) => token.filter(|t| !t.is_empty()).map(SecretString::from),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable session token");
                None
            }
        }
    }

    /// Remove the token and user record together.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written; in that case
    /// nothing was removed.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_all(&[keys::TOKEN, keys::USER])?;
        debug!("Session cleared");
        Ok(())
    }

    fn read_user(&self) -> Result<Option<AuthUser>, StorageError> {
        let Some(token) = self.storage.get(keys::TOKEN)? else {
            return Ok(None);
        };
        if token.is_empty() {
            return Ok(None);
        }
        let Some(raw) = self.storage.get(keys::USER)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }
}

// =============================================================================
// Backends
// =============================================================================

/// In-process storage, for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut map = self.entries.lock();
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut map = self.entries.lock();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// JSON file in the state directory.
///
/// Every write goes to a sibling temp file that is then renamed over the
/// record, so a crash mid-write leaves the previous record intact.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStorage {
    /// Storage at `<dir>/session.json`. The directory is created on first write.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(SESSION_FILE),
            lock: Mutex::new(()),
        }
    }

    /// Location of the session record.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(serde_json::to_string_pretty(map)?.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key))
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        // A corrupted record is replaced rather than blocking a new login.
        let mut map = self.load().unwrap_or_default();
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        self.store(&map)
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut map = self.load().unwrap_or_default();
        for key in keys {
            map.remove(*key);
        }
        self.store(&map)
    }
}
