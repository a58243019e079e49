//! JSON-file store
//!
//! The whole map lives in memory and is rewritten to disk on every change.

use super::KeyValueStore;
use crate::types::{ConfigError, Result};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, creating parent directories as needed
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let entries: BTreeMap<String, String> = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|source| ConfigError::CorruptEntry {
                    key: path.display().to_string(),
                    source,
                })?
            }
        } else {
            BTreeMap::new()
        };

        debug!("Opened store {} with {} entries", path.display(), entries.len());

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Default location: <data_dir>/snitch-config/store.json
    pub fn default_path() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join("snitch-config").join("store.json"))
            .ok_or_else(|| {
                ConfigError::Settings("Cannot determine data directory for the store".to_string())
            })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value.to_string());
        self.save(&updated)?;
        *entries = updated;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        if !entries.contains_key(key) {
            return Ok(());
        }

        let mut updated = entries.clone();
        updated.remove(key);
        self.save(&updated)?;
        *entries = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::open(&path).unwrap();
        store.set("ds-scope", r#"["*.example.com"]"#).unwrap();
        store.set("ds-debug", "true").unwrap();
        store.delete("ds-debug").unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("ds-scope").as_deref(), Some(r#"["*.example.com"]"#));
        assert_eq!(reopened.get("ds-debug"), None);
    }

    #[test]
    fn test_failed_write_leaves_entries_unchanged() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        let store = FileStore::open(nested.join("store.json")).unwrap();
        store.set("ds-scope", r#"["a.test"]"#).unwrap();

        fs::remove_dir_all(&nested).unwrap();

        assert!(store.set("ds-debug", "true").is_err());
        assert_eq!(store.get("ds-debug"), None);

        assert!(store.delete("ds-scope").is_err());
        assert_eq!(store.get("ds-scope").as_deref(), Some(r#"["a.test"]"#));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ truncated").unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(ConfigError::CorruptEntry { .. })
        ));
    }

    #[test]
    fn test_empty_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("ds-scope"), None);
    }
}
