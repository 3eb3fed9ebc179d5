//! Cache Facade Module
//!
//! get / set / forget over a [`Store`], with TTL normalization, JSON values
//! and the get-or-compute fallback.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cache::{codec, Fallback, Ttl};
use crate::config::Config;
use crate::error::Result;
use crate::store::{RedisStore, Store};

// == Cache ==
/// Cache facade over a key-value store.
///
/// Holds nothing but the store handle. The miss path of
/// [`get_or`](Cache::get_or) is a read followed by a write, not an atomic
/// operation: concurrent misses on the same key may each run the fallback,
/// and the last write wins.
#[derive(Debug, Clone)]
pub struct Cache<S> {
    store: S,
}

impl Cache<RedisStore> {
    /// Connects to Redis using configuration.
    pub async fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(RedisStore::from_config(config).await?))
    }
}

impl<S: Store> Cache<S> {
    // == Constructor ==
    /// Wraps a store client.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // == Get ==
    /// Reads a value, `None` if the key is missing or expired.
    ///
    /// Stored JSON objects and arrays are returned decoded. Everything else is
    /// returned as the exact stored string.
    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        let raw = self.store.read(key).await?;
        Ok(raw.map(codec::decode))
    }

    // == Get Or ==
    /// Reads a value, falling back to `fallback` on a miss.
    ///
    /// On a miss the fallback is resolved (producers are awaited) and, when a
    /// `ttl` is given, written back through [`set`](Cache::set) before being
    /// returned. A fallback resolving to `null` is returned as `None` and not
    /// written.
    ///
    /// Without a `ttl` the fallback value is returned but not cached. This
    /// mirrors long-standing behavior and may not be what callers expect.
    ///
    /// # Arguments
    /// * `key` - The key to read
    /// * `fallback` - Literal value or producer used on a miss
    /// * `ttl` - Lifetime of the cached fallback value
    pub async fn get_or(
        &self,
        key: &str,
        fallback: impl Into<Fallback>,
        ttl: Option<Ttl>,
    ) -> Result<Option<Value>> {
        if let Some(value) = self.get(key).await? {
            return Ok(Some(value));
        }

        let value = fallback.into().resolve().await?;
        if value.is_null() {
            debug!(key, "Fallback resolved to null, nothing cached");
            return Ok(None);
        }

        match ttl {
            Some(ttl) => self.set(key, &value, ttl).await?,
            None => debug!(key, "No TTL given, fallback value not cached"),
        }

        Ok(Some(value))
    }

    // == Set ==
    /// Stores a value that expires after `ttl`.
    ///
    /// The TTL is validated before anything is written. Objects and arrays
    /// are stored as JSON, scalars as plain text.
    ///
    /// A TTL that normalizes to zero or less (`"0 days"`, `"400 ms"`, a past
    /// date) is passed to the store as is. Redis and
    /// [`MemoryStore`](crate::store::MemoryStore) reject it with
    /// [`StoreError::InvalidExpiry`](crate::error::StoreError::InvalidExpiry).
    ///
    /// # Examples
    /// ```ignore
    /// cache.set("my-key", "foobar", "6 hours").await?;
    /// cache.set("my-key", &profile, Utc::now() + TimeDelta::days(30)).await?;
    /// cache.set("my-key", &[1, 2, 3], 3600).await?;
    /// ```
    pub async fn set<T>(&self, key: &str, value: &T, ttl: impl Into<Ttl>) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let expiry_seconds = ttl.into().seconds_from(Utc::now())?;
        let encoded = codec::encode(&serde_json::to_value(value)?)?;

        debug!(key, expiry_seconds, "Writing cache entry");
        self.store
            .write_with_expiry(key, encoded, expiry_seconds)
            .await?;
        Ok(())
    }

    // == Forget ==
    /// Deletes a key. Forgetting a missing key is not an error.
    pub async fn forget(&self, key: &str) -> Result<()> {
        debug!(key, "Forgetting cache entry");
        self.store.delete(key).await?;
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CacheError, StoreError};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn cache() -> Cache<MemoryStore> {
        Cache::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn test_set_and_get_plain_string() {
        let cache = cache();

        cache.set("key", "foo", "1 hour").await.unwrap();

        assert_eq!(cache.get("key").await.unwrap(), Some(json!("foo")));
        assert_eq!(cache.store().ttl("key").await, Some(3600));
    }

    #[tokio::test]
    async fn test_set_serializes_structs() {
        #[derive(Serialize)]
        struct Profile {
            name: &'static str,
            age: u8,
        }

        let cache = cache();
        let profile = Profile { name: "ada", age: 36 };

        cache.set("profile", &profile, 60).await.unwrap();

        assert_eq!(
            cache.get("profile").await.unwrap(),
            Some(json!({"name": "ada", "age": 36}))
        );
    }

    #[tokio::test]
    async fn test_numbers_come_back_as_text() {
        let cache = cache();

        cache.set("n", &42, "1 minute").await.unwrap();

        assert_eq!(cache.get("n").await.unwrap(), Some(json!("42")));
    }

    #[tokio::test]
    async fn test_invalid_ttl_writes_nothing() {
        let cache = cache();

        let result = cache.set("key", "value", "wrongttl").await;
        assert!(matches!(result, Err(CacheError::UnparseableTtl)));
        assert!(cache.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_past_deadline_rejected_by_store() {
        let cache = cache();

        let result = cache.set("key", "value", -5i64).await;
        assert!(matches!(
            result,
            Err(CacheError::Store(StoreError::InvalidExpiry(-5)))
        ));
    }

    #[tokio::test]
    async fn test_get_or_hit_skips_fallback() {
        let cache = cache();
        cache.set("key", "cached", 60).await.unwrap();

        let value = cache
            .get_or(
                "key",
                Fallback::from_fn(|| -> &'static str { panic!("fallback must not run on a hit") }),
                Some("1 hour".into()),
            )
            .await
            .unwrap();

        assert_eq!(value, Some(json!("cached")));
    }

    #[tokio::test]
    async fn test_get_or_null_fallback_is_absent() {
        let cache = cache();

        let value = cache
            .get_or("key", Fallback::from_fn(|| Value::Null), Some(60.into()))
            .await
            .unwrap();

        assert!(value.is_none());
        assert!(cache.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_get_or_invalid_ttl_propagates() {
        let cache = cache();

        let result = cache.get_or("key", "foobar", Some("5 foo".into())).await;
        assert!(matches!(result, Err(CacheError::InvalidTtlUnit(unit)) if unit == "foo"));
        assert!(cache.get("key").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_forget() {
        let cache = cache();
        cache.set("key", "value", "1 hour").await.unwrap();

        cache.forget("key").await.unwrap();
        cache.forget("key").await.unwrap();

        assert!(cache.get("key").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_second_ttl_rejected_by_store() {
        let cache = cache();

        for ttl in ["0 days", "0 seconds", "400 ms"] {
            let result = cache.set("key", "value", ttl).await;
            assert!(
                matches!(result, Err(CacheError::Store(StoreError::InvalidExpiry(0)))),
                "{} should normalize to 0 and be rejected",
                ttl
            );
        }
        assert!(cache.store().is_empty().await);

        // Half a second rounds up to a storable TTL
        cache.set("key", "value", "500 ms").await.unwrap();
        assert_eq!(cache.get("key").await.unwrap(), Some(json!("value")));
    }

    #[tokio::test]
    async fn test_from_config_bad_url() {
        let config = Config {
            redis_url: "not a redis url".to_string(),
        };

        let result = Cache::from_config(&config).await;
        assert!(matches!(result, Err(CacheError::Store(StoreError::Backend(_)))));
    }
}
