//! Persistence boundary for store state.
//!
//! Stores do not talk to the filesystem directly; they hold a
//! [`StateStore`] and call `save` after every mutation and `load` once at
//! construction. The production implementation is [`JsonFileStore`], which
//! keeps one JSON document per namespaced key. [`MemoryStore`] backs tests
//! and ephemeral sessions.
//!
//! Persisted records carry a schema version field and deserialization
//! ignores unknown fields, so future field additions stay readable.

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Errors from the persistence layer.
///
/// These never cross a store's public boundary; stores log and recover.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Serialize/deserialize boundary for one store's durable state.
pub trait StateStore<T>: Send + Sync {
    /// Persist the record, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or written.
    fn save(&self, state: &T) -> Result<(), PersistError>;

    /// Load the previously persisted record.
    ///
    /// Returns `Ok(None)` when nothing has been persisted yet.
    ///
    /// # Errors
    ///
    /// Returns an error if a record exists but cannot be read or parsed.
    fn load(&self) -> Result<Option<T>, PersistError>;
}

/// File-backed [`StateStore`] keeping one JSON document per key.
///
/// Writes go to a sibling temp file first and are moved into place with a
/// rename, so a crash mid-write leaves the previous record intact.
pub struct JsonFileStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    /// Create a store persisting under `<data_dir>/<key>.json`.
    #[must_use]
    pub fn new(data_dir: &Path, key: &str) -> Self {
        Self {
            path: data_dir.join(format!("{key}.json")),
            _marker: PhantomData,
        }
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl<T> StateStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned,
{
    fn save(&self, state: &T) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(state)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), "persisted state");
        Ok(())
    }

    fn load(&self) -> Result<Option<T>, PersistError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)?;
        let state = serde_json::from_str(&json)?;
        Ok(Some(state))
    }
}

/// In-memory [`StateStore`] for tests and ephemeral sessions.
///
/// State still round-trips through JSON so tests exercise the same
/// serialization path as the file-backed store.
#[derive(Default)]
pub struct MemoryStore<T> {
    slot: std::sync::Mutex<Option<String>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MemoryStore<T> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: std::sync::Mutex::new(None),
            _marker: PhantomData,
        }
    }

    /// Create a store pre-seeded with a raw JSON document, as if a prior
    /// process had persisted it.
    #[must_use]
    pub fn seeded(json: impl Into<String>) -> Self {
        Self {
            slot: std::sync::Mutex::new(Some(json.into())),
            _marker: PhantomData,
        }
    }

    /// The raw persisted document, if any.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl<T> StateStore<T> for MemoryStore<T>
where
    T: Serialize + DeserializeOwned,
{
    fn save(&self, state: &T) -> Result<(), PersistError> {
        let json = serde_json::to_string(state)?;
        *self
            .slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(json);
        Ok(())
    }

    fn load(&self) -> Result<Option<T>, PersistError> {
        let slot = self
            .slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match slot.as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }
}
