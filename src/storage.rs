//! Key/value storage port.
//!
//! Every persisted value is a JSON-encoded string under a well-known key,
//! matching the storage layout of the storefront pages. A single writer is
//! assumed; concurrent writers race with last-write-wins semantics and no
//! merge or version check.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::{Result, StoreError};

/// Well-known storage keys.
pub mod keys {
    /// Combined cross-category product view read by storefront pages.
    pub const COMBINED_PRODUCTS: &str = "middleClassProducts";
    /// Admin session record.
    pub const ADMIN_SESSION: &str = "adminSession";
    /// Default storefront cart. Storefront variants may open their own key.
    pub const STOREFRONT_CART: &str = "tshirtCart";
}

/// Synchronous key/value persistence boundary.
pub trait StoragePort: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a key, replacing any prior value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory storage, used by tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Storage("storage mutex poisoned".into()))
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// File-backed storage: one JSON object of `key -> value string`, loaded at
/// open and rewritten on every mutation. An unreadable file degrades to an
/// empty map rather than failing the session.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "unreadable store file, starting empty");
                HashMap::new()
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                warn!(path = %path.display(), %err, "store file could not be read, starting empty");
                HashMap::new()
            }
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Storage("storage mutex poisoned".into()))
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<()> {
        let raw = serde_json::to_string(entries).map_err(|e| StoreError::Storage(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| StoreError::Storage(e.to_string()))
    }
}

impl StoragePort for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock()?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.lock()?;
        entries.remove(key);
        self.flush(&entries)
    }
}

/// Read and decode a key. Absent keys, storage failures and unreadable JSON
/// all come back as `None`; failures are logged, never propagated.
pub(crate) fn get_json<T: DeserializeOwned>(storage: &dyn StoragePort, key: &str) -> Option<T> {
    match storage.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, %err, "discarding unreadable entry");
                None
            }
        },
        Ok(None) => None,
        Err(err) => {
            warn!(key, %err, "storage read failed");
            None
        }
    }
}

/// Encode and write a key. Returns false on failure, leaving the prior
/// persisted value intact.
pub(crate) fn set_json<T: Serialize>(storage: &dyn StoragePort, key: &str, value: &T) -> bool {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(key, %err, "value failed to serialize");
            return false;
        }
    };
    match storage.set(key, &raw) {
        Ok(()) => true,
        Err(err) => {
            warn!(key, %err, "storage write failed");
            false
        }
    }
}

pub(crate) fn remove_key(storage: &dyn StoragePort, key: &str) -> bool {
    match storage.remove(key) {
        Ok(()) => true,
        Err(err) => {
            warn!(key, %err, "storage remove failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("missing").unwrap(), None);
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
        // removing again is fine
        storage.remove("k").unwrap();
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let storage = FileStorage::open(&path);
        storage.set("cart", "[]").unwrap();
        storage.set("session", "{\"ok\":true}").unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.get("cart").unwrap().as_deref(), Some("[]"));
        assert_eq!(
            reopened.get("session").unwrap().as_deref(),
            Some("{\"ok\":true}")
        );
    }

    #[test]
    fn test_file_storage_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json at all").unwrap();

        let storage = FileStorage::open(&path);
        assert_eq!(storage.get("anything").unwrap(), None);
        // and the store is usable afterwards
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_json_helpers_swallow_garbage() {
        let storage = MemoryStorage::new();
        storage.set("bad", "{{{").unwrap();
        assert_eq!(get_json::<Vec<String>>(&storage, "bad"), None);

        assert!(set_json(&storage, "good", &vec!["a".to_string()]));
        assert_eq!(
            get_json::<Vec<String>>(&storage, "good"),
            Some(vec!["a".to_string()])
        );
        assert!(remove_key(&storage, "good"));
        assert_eq!(get_json::<Vec<String>>(&storage, "good"), None);
    }
}
