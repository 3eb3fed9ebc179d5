//! Store Module
//!
//! The key-value store the cache facade delegates to: a Redis-backed
//! implementation and an in-memory one with the same expiry semantics.

mod entry;
mod memory;
mod redis_store;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;

pub use entry::StoredEntry;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Convenience Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Store Port ==
/// Port for the backing key-value store.
///
/// Each call is expected to be atomic on its own. The facade never combines
/// calls into a transaction.
#[async_trait]
pub trait Store: Send + Sync {
    /// Reads the raw value stored under `key`, `None` if absent or expired.
    async fn read(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes `value` under `key`, expiring `expiry_seconds` from now.
    async fn write_with_expiry(
        &self,
        key: &str,
        value: String,
        expiry_seconds: i64,
    ) -> StoreResult<()>;

    /// Deletes `key`. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> StoreResult<()>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    async fn read(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).read(key).await
    }

    async fn write_with_expiry(
        &self,
        key: &str,
        value: String,
        expiry_seconds: i64,
    ) -> StoreResult<()> {
        (**self).write_with_expiry(key, value, expiry_seconds).await
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        (**self).delete(key).await
    }
}

#[async_trait]
impl<S: Store + ?Sized> Store for Box<S> {
    async fn read(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).read(key).await
    }

    async fn write_with_expiry(
        &self,
        key: &str,
        value: String,
        expiry_seconds: i64,
    ) -> StoreResult<()> {
        (**self).write_with_expiry(key, value, expiry_seconds).await
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        (**self).delete(key).await
    }
}
