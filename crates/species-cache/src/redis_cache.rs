//! Redis-backed cache

use crate::error::Result;
use crate::CacheClient;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, info};

/// Cache adapter over a multiplexed Redis connection
///
/// The connection is cloned per command, so concurrent lookups pipeline
/// over one socket instead of queueing behind each other.
pub struct RedisCache {
    connection: MultiplexedConnection,
}

impl RedisCache {
    /// Connect to the Redis server at `url` (e.g. `redis://localhost:6379`)
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        info!("Connected to Redis");
        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheClient for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.connection.clone();
        // PSETEX rejects a zero expiry
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        let _: () = conn.pset_ex(key, value, millis).await?;
        debug!(key, ttl_ms = millis, "Stored cache entry");
        Ok(())
    }
}
