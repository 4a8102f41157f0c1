//! In-memory storage backend. Nothing survives the process; used by tests
//! and as a fallback when no writable data directory exists.

use super::{SessionStorage, StorageError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

/// `HashMap`-backed store behind a mutex.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys (test convenience).
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_roundtrip() {
        let store = MemoryStorage::new();
        store.set("@user", "{\"a\":1}").await.unwrap();
        assert_eq!(store.get("@user").await.unwrap().as_deref(), Some("{\"a\":1}"));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = MemoryStorage::new();
        assert!(store.get("@user").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_overwrites_whole_value() {
        let store = MemoryStorage::new();
        store.set("@user", "old").await.unwrap();
        store.set("@user", "new").await.unwrap();
        assert_eq!(store.get("@user").await.unwrap().as_deref(), Some("new"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStorage::new();
        store.set("@user", "v").await.unwrap();
        store.delete("@user").await.unwrap();
        store.delete("@user").await.unwrap();
        assert!(store.get("@user").await.unwrap().is_none());
    }
}
