use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::PersistError;

/// Storage key holding the serialized session object.
pub const SESSION_KEY: &str = "userInfo";
/// Storage key holding the display theme preference.
pub const THEME_KEY: &str = "theme";

/// KeyValueStore
///
/// Durable client storage. Reads are synchronous so that the session can be
/// restored before the first page is built.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PersistError>;
    fn remove(&self, key: &str) -> Result<(), PersistError>;
}

pub type StoreHandle = Arc<dyn KeyValueStore>;

/// FileStore
///
/// One file per key inside a data directory. The directory is created lazily
/// on first write.
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

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are fixed constants, but keep them from escaping the directory.
        let file: String = key
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .collect();
        self.dir.join(file)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// MemoryStore
///
/// In-process storage. Clones share the same map, which is how tests simulate
/// "reloading the view layer" over the same persisted state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get(SESSION_KEY).unwrap(), None);
        store.set(SESSION_KEY, "{\"token\":\"t\"}").unwrap();
        assert_eq!(
            store.get(SESSION_KEY).unwrap().as_deref(),
            Some("{\"token\":\"t\"}")
        );

        store.remove(SESSION_KEY).unwrap();
        assert_eq!(store.get(SESSION_KEY).unwrap(), None);
        // Removing twice is not an error.
        store.remove(SESSION_KEY).unwrap();
    }

    #[test]
    fn file_store_keys_cannot_escape_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("../../evil", "x").unwrap();
        assert!(dir.path().join("evil").exists());
    }

    #[test]
    fn memory_store_clones_share_state() {
        let store = MemoryStore::new();
        let reloaded = store.clone();
        store.set(THEME_KEY, "dark").unwrap();
        assert_eq!(reloaded.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }
}
