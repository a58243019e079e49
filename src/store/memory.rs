//! In-process store, used by tests and embedders that persist elsewhere

use super::KeyValueStore;
use crate::types::Result;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let store = MemoryStore::new();
        assert_eq!(store.get("ds-debug"), None);

        store.set("ds-debug", "true").unwrap();
        assert_eq!(store.get("ds-debug").as_deref(), Some("true"));

        store.set("ds-debug", "false").unwrap();
        assert_eq!(store.get("ds-debug").as_deref(), Some("false"));

        store.delete("ds-debug").unwrap();
        assert_eq!(store.get("ds-debug"), None);
        store.delete("ds-debug").unwrap();
    }
}
