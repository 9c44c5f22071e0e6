use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{KeyValueStore, StorageError};

/// Process-local store. An optional byte quota makes writes fail the way a
/// full browser store does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Arc<RwLock<HashMap<String, String>>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: Arc::new(RwLock::new(HashMap::new())),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn used_bytes(&self) -> usize {
        self.items
            .read()
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.write();

        if let Some(quota) = self.quota_bytes {
            let others: usize = items
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys: Vec<String> = self.items.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let store = MemoryStore::new();
        assert_eq!(store.get_item("a").unwrap(), None);

        store.set_item("a", "1").unwrap();
        store.set_item("b", "2").unwrap();
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);

        store.remove_item("a").unwrap();
        store.remove_item("a").unwrap();
        assert_eq!(store.get_item("a").unwrap(), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_quota_exceeded() {
        let store = MemoryStore::with_quota(16);
        store.set_item("key", "0123456789").unwrap();

        let err = store.set_item("other", "0123456789").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));

        // Replacing an existing value only counts the new size.
        store.set_item("key", "abcdefghij").unwrap();
        assert_eq!(store.used_bytes(), 13);
    }
}
