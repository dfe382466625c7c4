//! Key/value cache adapters with per-key expiry
//!
//! The species service treats its cache as an opaque string store. Two
//! backends implement [`CacheClient`]: [`RedisCache`] for deployments and
//! [`MemoryCache`] for tests and single-process runs.

mod error;
mod memory;
mod redis_cache;

pub use crate::error::{CacheError, Result};
pub use crate::memory::MemoryCache;
pub use crate::redis_cache::RedisCache;

use async_trait::async_trait;
use std::time::Duration;

/// Minimal cache surface used by the lookup engine
#[async_trait]
pub trait CacheClient: Send + Sync {
    /// Fetch the value stored under `key`, if present and not expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, expiring after `ttl`
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}
