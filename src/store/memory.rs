//! Memory Store Module
//!
//! HashMap-backed store with SETEX-style writes and lazy expiry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::{Store, StoreResult, StoredEntry};

// == Memory Store ==
/// In-process store with per-entry expiry, mainly for tests and local use.
///
/// Entries live until their deadline or an explicit delete. Clones share
/// the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, StoredEntry>>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Time To Live ==
    /// Returns the remaining lifetime of `key` in seconds.
    ///
    /// `None` if the key is absent or already expired.
    pub async fn ttl(&self, key: &str) -> Option<u64> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(StoredEntry::ttl_remaining)
    }

    // == Length ==
    /// Returns the number of entries held, including expired ones not yet read.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn read(&self, key: &str) -> StoreResult<Option<String>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: drop it on the way out
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(StoredEntry::is_expired) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn write_with_expiry(
        &self,
        key: &str,
        value: String,
        expiry_seconds: i64,
    ) -> StoreResult<()> {
        if expiry_seconds <= 0 {
            return Err(StoreError::InvalidExpiry(expiry_seconds));
        }

        self.entries.write().await.insert(
            key.to_string(),
            StoredEntry::new(value, expiry_seconds as u64),
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_store_new() {
        let store = MemoryStore::new();
        assert_eq!(store.len().await, 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_write_and_read() {
        let store = MemoryStore::new();

        store
            .write_with_expiry("key1", "value1".to_string(), 60)
            .await
            .unwrap();

        assert_eq!(store.read("key1").await.unwrap().as_deref(), Some("value1"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_read_nonexistent() {
        let store = MemoryStore::new();
        assert!(store.read("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_rejects_non_positive_expiry() {
        let store = MemoryStore::new();

        let result = store.write_with_expiry("key", "v".to_string(), 0).await;
        assert!(matches!(result, Err(StoreError::InvalidExpiry(0))));

        let result = store.write_with_expiry("key", "v".to_string(), -30).await;
        assert!(matches!(result, Err(StoreError::InvalidExpiry(-30))));

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_delete_is_idempotent() {
        let store = MemoryStore::new();

        store
            .write_with_expiry("key1", "value1".to_string(), 60)
            .await
            .unwrap();
        store.delete("key1").await.unwrap();
        store.delete("key1").await.unwrap();
        store.delete("never_set").await.unwrap();

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_overwrite_resets_expiry() {
        let store = MemoryStore::new();

        store
            .write_with_expiry("key1", "value1".to_string(), 10)
            .await
            .unwrap();
        store
            .write_with_expiry("key1", "value2".to_string(), 3600)
            .await
            .unwrap();

        assert_eq!(store.read("key1").await.unwrap().as_deref(), Some("value2"));
        assert_eq!(store.ttl("key1").await, Some(3600));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_expiration() {
        let store = MemoryStore::new();

        store
            .write_with_expiry("key1", "value1".to_string(), 1)
            .await
            .unwrap();
        assert!(store.read("key1").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert!(store.read("key1").await.unwrap().is_none());
        assert!(store.ttl("key1").await.is_none());
        // Lazy expiry removed the entry on read
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_keeps_every_key() {
        let store = MemoryStore::new();

        for i in 0..500 {
            store
                .write_with_expiry(&format!("key{}", i), "v".to_string(), 60)
                .await
                .unwrap();
        }

        assert_eq!(store.len().await, 500);
        assert!(store.read("key0").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();

        store
            .write_with_expiry("key", "value".to_string(), 60)
            .await
            .unwrap();

        assert_eq!(other.read("key").await.unwrap().as_deref(), Some("value"));
    }
}
