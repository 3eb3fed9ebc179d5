//! Redis Store Module
//!
//! [`Store`] backed by a Redis server: GET, SETEX and DEL over a
//! reconnecting connection manager.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Client;
use tracing::info;

use crate::config::Config;
use crate::error::StoreError;
use crate::store::{Store, StoreResult};

// == Redis Store ==
/// Redis-backed store.
///
/// Cloning is cheap and shares the underlying connection.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    // == Constructor ==
    /// Connects to the server at `url`.
    ///
    /// Invalid URLs and connection failures are reported as
    /// [`StoreError::Backend`].
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let client = Client::open(url).map_err(StoreError::backend)?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(StoreError::backend)?;

        info!("Connected to Redis");
        Ok(Self { connection })
    }

    /// Connects using the URL from configuration.
    pub async fn from_config(config: &Config) -> StoreResult<Self> {
        Self::connect(&config.redis_url).await
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let mut connection = self.connection.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut connection)
            .await
            .map_err(StoreError::backend)?;
        Ok(value)
    }

    async fn write_with_expiry(
        &self,
        key: &str,
        value: String,
        expiry_seconds: i64,
    ) -> StoreResult<()> {
        // Same rule the server applies; fail before the round trip
        if expiry_seconds <= 0 {
            return Err(StoreError::InvalidExpiry(expiry_seconds));
        }

        let mut connection = self.connection.clone();
        let () = redis::cmd("SETEX")
            .arg(key)
            .arg(expiry_seconds)
            .arg(value)
            .query_async(&mut connection)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut connection = self.connection.clone();
        let _removed: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut connection)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }
}
