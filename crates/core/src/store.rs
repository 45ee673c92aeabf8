//! Key-value persistence port and its adapters

use crate::StoreError;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Persistent string storage backing the session
///
/// Mirrors the browser's local storage contract: reads never fail, writes may.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}


/// Ephemeral store, lost when dropped
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `entries`
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store persisted as a flat JSON object on disk
///
/// The whole map is rewritten after every mutation.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file does not exist yet
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self { path, entries })
    }

    /// Platform default location of the session file
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "pm-panel")
            .map(|dirs| dirs.data_dir().join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

/// Browser local storage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        use gloo::storage::Storage;
        gloo::storage::LocalStorage::raw()
            .get_item(key)
            .ok()
            .flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        use gloo::storage::Storage;
        gloo::storage::LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        use gloo::storage::Storage;
        gloo::storage::LocalStorage::raw()
            .remove_item(key)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::with_entries([("a", "1")]);
        assert_eq!(store.get("a").as_deref(), Some("1"));

        store.set("b", "2").unwrap();
        store.remove("a").unwrap();
        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b").as_deref(), Some("2"));
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("pm_token"), None);
        store.set("pm_token", "abc").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("pm_token").as_deref(), Some("abc"));

        let mut reopened = reopened;
        reopened.remove("pm_token").unwrap();
        assert_eq!(FileStore::open(&path).unwrap().get("pm_token"), None);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let result = FileStore::open(&path);
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }
}
