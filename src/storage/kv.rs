//! Key-value backends
//!
//! The expense collection lives under a single key. A backend only has to
//! get and set UTF-8 text; everything else happens in [`super::ExpenseStore`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{ExpenseError, ExpenseResult};

use super::file_io::{read_text, write_text_atomic};

/// Minimal durable key-value storage
///
/// `get` failures are reported as [`ExpenseError::StorageRead`] and `set`
/// failures as [`ExpenseError::StorageWrite`].
pub trait KeyValueStore {
    /// Read the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> ExpenseResult<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> ExpenseResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> ExpenseResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> ExpenseResult<()> {
        (**self).set(key, value)
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a key
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> ExpenseResult<Option<String>> {
        let path = self.path_for(key);
        read_text(&path).map_err(|e| {
            ExpenseError::StorageRead(format!("Failed to open {}: {}", path.display(), e))
        })
    }

    fn set(&self, key: &str, value: &str) -> ExpenseResult<()> {
        let path = self.path_for(key);
        write_text_atomic(&path, value).map_err(|e| {
            ExpenseError::StorageWrite(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

/// In-process storage, mainly for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> ExpenseResult<Option<String>> {
        let entries = self.entries.lock().map_err(|e| {
            ExpenseError::StorageRead(format!("Failed to acquire lock: {}", e))
        })?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ExpenseResult<()> {
        let mut entries = self.entries.lock().map_err(|e| {
            ExpenseError::StorageWrite(format!("Failed to acquire lock: {}", e))
        })?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        assert_eq!(store.get("expenses").unwrap(), None);
        store.set("expenses", "[]").unwrap();
        assert_eq!(store.get("expenses").unwrap().as_deref(), Some("[]"));
        assert!(temp_dir.path().join("expenses.json").exists());
    }

    #[test]
    fn test_file_store_write_failure_is_a_storage_write_error() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the directory should be
        let blocker = temp_dir.path().join("data");
        std::fs::write(&blocker, "x").unwrap();

        let store = FileStore::new(&blocker);
        let err = store.set("expenses", "[]").unwrap_err();
        assert!(matches!(err, ExpenseError::StorageWrite(_)));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::with_entry("expenses", "[1]");
        assert_eq!(store.get("expenses").unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.get("other").unwrap(), None);

        store.set("expenses", "[]").unwrap();
        assert_eq!(store.get("expenses").unwrap().as_deref(), Some("[]"));
    }
}
