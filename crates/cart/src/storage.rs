//! Durable key-value slot for the persisted cart.
//!
//! The store only ever needs `get` and `set` of opaque strings, the same
//! contract as browser local storage. Two backends are provided:
//!
//! - [`FileStore`] keeps every key in one JSON object on disk, so a cart
//!   survives process restarts
//! - [`MemoryStore`] keeps keys in process memory and counts writes

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur when reading or writing the durable slot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("Storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Backing file is not a JSON object of strings.
    #[error("Corrupt storage file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A string-to-string durable key-value slot.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

// =============================================================================
// FileStore
// =============================================================================

/// Key-value slot backed by a single JSON file.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// original, so a crash mid-write never leaves a truncated file behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(StorageError::Corrupt { source, .. }) => {
                warn!(
                    path = %self.path.display(),
                    error = %source,
                    "Replacing corrupt storage file"
                );
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let contents = serde_json::to_string_pretty(&entries).map_err(|source| {
            StorageError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), key, "Wrote storage slot");
        Ok(())
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-process key-value slot.
///
/// Clones share the same map, so a caller can keep a handle to inspect what
/// a [`crate::CartStore`] wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    entries: BTreeMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with one key, without counting it as a write.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.lock().entries.insert(key.to_string(), value.to_string());
        store
    }

    /// Number of `set` calls so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, MemoryStoreInner> {
        // A panic while holding the lock cannot leave the map half-updated
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.lock();
        inner.entries.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("storage.json"));
        assert_eq!(store.get("@RocketShoes:cart").unwrap(), None);
    }

    #[test]
    fn test_file_store_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");
        let store = FileStore::new(&path);

        store.set("@RocketShoes:cart", "[]").unwrap();
        store.set("other", "value").unwrap();
        store.set("@RocketShoes:cart", "[1]").unwrap();

        // A fresh handle sees what the first one wrote
        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get("@RocketShoes:cart").unwrap().as_deref(),
            Some("[1]")
        );
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("value"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();

        let err = FileStore::new(&path).get("key").unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[test]
    fn test_file_store_write_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "garbage").unwrap();
        let store = FileStore::new(&path);

        store.set("@RocketShoes:cart", "[]").unwrap();

        assert_eq!(store.get("@RocketShoes:cart").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_memory_store_counts_writes() {
        let store = MemoryStore::with_entry("key", "seed");
        assert_eq!(store.writes(), 0);
        assert_eq!(store.get("key").unwrap().as_deref(), Some("seed"));

        let handle = store.clone();
        store.set("key", "next").unwrap();
        assert_eq!(handle.writes(), 1);
        assert_eq!(handle.get("key").unwrap().as_deref(), Some("next"));
    }
}
