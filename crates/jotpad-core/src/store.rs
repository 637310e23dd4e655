use std::collections::HashMap;

use crate::error::StoreError;

/// Key holding the raw document text.
pub const CONTENT_KEY: &str = "jotpad.content";
/// Key holding the JSON settings blob.
pub const SETTINGS_KEY: &str = "jotpad.settings";

/// Key-value storage that lives exactly as long as one editing session.
///
/// Nothing written here is expected to survive a restart.
pub trait EphemeralStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str);
}

/// Process-lifetime store, optionally bounded by a byte quota counted over
/// every key and value it holds.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(quota),
        }
    }

    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EphemeralStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota {
            let replaced = self.entries.get(key).map_or(0, |old| key.len() + old.len());
            let others = self.used_bytes() - replaced;
            let needed = key.len() + value.len();
            let available = quota.saturating_sub(others);
            if needed > available {
                return Err(StoreError::QuotaExceeded { needed, available });
            }
        }

        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let mut store = MemoryStore::new();
        assert!(store.get(CONTENT_KEY).is_none());
        assert!(store.set(CONTENT_KEY, "hello").is_ok());
        assert_eq!(store.get(CONTENT_KEY).as_deref(), Some("hello"));
        store.remove(CONTENT_KEY);
        assert!(store.get(CONTENT_KEY).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_old_value() {
        let mut store = MemoryStore::with_quota(CONTENT_KEY.len() + 8);
        assert!(store.set(CONTENT_KEY, "12345678").is_ok());

        let result = store.set(CONTENT_KEY, "123456789");
        assert!(matches!(
            result,
            Err(StoreError::QuotaExceeded { needed, available })
                if needed == CONTENT_KEY.len() + 9 && available == CONTENT_KEY.len() + 8
        ));
        assert_eq!(store.get(CONTENT_KEY).as_deref(), Some("12345678"));
    }

    #[test]
    fn quota_counts_replaced_value_as_free() {
        let mut store = MemoryStore::with_quota(CONTENT_KEY.len() + 4);
        assert!(store.set(CONTENT_KEY, "abcd").is_ok());
        assert!(store.set(CONTENT_KEY, "wxyz").is_ok());
        assert_eq!(store.used_bytes(), CONTENT_KEY.len() + 4);
    }
}
