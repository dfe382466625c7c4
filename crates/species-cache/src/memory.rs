//! In-process cache with per-entry expiry

use crate::error::Result;
use crate::CacheClient;
use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone)]
struct StoredValue {
    value: String,
    expires_at: Instant,
}

/// Bounded in-memory cache honoring the TTL given on each write
///
/// Expiry is checked against the tokio clock, so paused-time tests can
/// advance past a TTL without sleeping.
pub struct MemoryCache {
    entries: Cache<String, StoredValue>,
}

impl MemoryCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(max_capacity).build(),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entries.get(key).await {
            Some(stored) if Instant::now() < stored.expires_at => Ok(Some(stored.value)),
            Some(_) => {
                self.entries.invalidate(key).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let stored = StoredValue {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(key.to_string(), stored).await;
        Ok(())
    }
}
