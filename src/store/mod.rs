//! Key-value store backing the persisted settings
//!
//! Values are strings; structured settings are stored as JSON text. The store
//! is accessed synchronously and the last write wins.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::types::{ConfigError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// String-keyed durable store
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when the key has never been set or was deleted
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn delete(&self, key: &str) -> Result<()>;
}

/// Named slots used by the configuration pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Map of heuristic display name to 0/1 enablement flag
    EnabledHeuristics,
    IgnoreRules,
    SafeOrigins,
    Scope,
    /// Override for the configuration document location
    ConfigUrl,
    /// Global switch; any value other than "true" disables `apply_config`
    ConfigEnable,
    /// Previously applied configuration document
    CachedConfig,
    Debug,
}

impl StoreKey {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::EnabledHeuristics => "ds-opt-config",
            StoreKey::IgnoreRules => "ds-ignoreRules",
            StoreKey::SafeOrigins => "ds-origins",
            StoreKey::Scope => "ds-scope",
            StoreKey::ConfigUrl => "ds-config-url",
            StoreKey::ConfigEnable => "ds-config-enable",
            StoreKey::CachedConfig => "ds-config-data",
            StoreKey::Debug => "ds-debug",
        }
    }
}

/// Read a JSON entry, falling back to the type's default when unset
pub fn read_json<T>(store: &dyn KeyValueStore, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match store.get(key) {
        Some(raw) => serde_json::from_str(&raw).map_err(|source| ConfigError::CorruptEntry {
            key: key.to_string(),
            source,
        }),
        None => Ok(T::default()),
    }
}

pub fn write_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_read_json_defaults_when_unset() {
        let store = MemoryStore::new();
        let scope: Vec<String> = read_json(&store, StoreKey::Scope.as_str()).unwrap();
        assert!(scope.is_empty());
    }

    #[test]
    fn test_write_then_read_json() {
        let store = MemoryStore::new();
        let mut map = BTreeMap::new();
        map.insert("Mixed content".to_string(), 1u8);
        write_json(&store, StoreKey::EnabledHeuristics.as_str(), &map).unwrap();

        assert_eq!(
            store.get("ds-opt-config").as_deref(),
            Some(r#"{"Mixed content":1}"#)
        );
        let back: BTreeMap<String, u8> =
            read_json(&store, StoreKey::EnabledHeuristics.as_str()).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_corrupt_entry_is_reported() {
        let store = MemoryStore::new();
        store.set("ds-scope", "[not json").unwrap();
        let result: Result<Vec<String>> = read_json(&store, "ds-scope");
        assert!(matches!(result, Err(ConfigError::CorruptEntry { .. })));
    }
}
