//! Cache-aside retrieval of species records
//!
//! Reads try the cache first and fall back to the store on a miss, writing
//! the stored record back into the cache with a fixed TTL. Absent ids are
//! never cached. Cache faults and unreadable cached payloads degrade to a
//! miss; only a store fault is reported to the caller.

use crate::types::CacheStats;
use species_cache::CacheClient;
use species_db::{DbError, SpeciesRecord, SpeciesStore};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

const CACHE_KEY_PREFIX: &str = "species:";

/// Cache key under which a species record is stored
pub fn cache_key(id: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, id)
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    Hit {
        record: SpeciesRecord,
        from_cache: bool,
    },
    NotFound,
}

#[derive(Debug)]
pub enum LookupError {
    StoreUnavailable(DbError),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::StoreUnavailable(err) => write!(f, "Species store unavailable: {}", err),
        }
    }
}

impl std::error::Error for LookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LookupError::StoreUnavailable(err) => Some(err),
        }
    }
}

pub struct SpeciesLookup {
    cache: Arc<dyn CacheClient>,
    store: Arc<dyn SpeciesStore>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SpeciesLookup {
    pub fn new(cache: Arc<dyn CacheClient>, store: Arc<dyn SpeciesStore>, ttl: Duration) -> Self {
        Self {
            cache,
            store,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Get a species by id
    pub async fn lookup(&self, id: &str) -> Result<LookupResult, LookupError> {
        let key = cache_key(id);

        if let Some(record) = self.read_cache(&key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(id, "Cache hit");
            return Ok(LookupResult::Hit {
                record,
                from_cache: true,
            });
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(id, "Cache miss, querying store");

        let record = match self.store.get_species(id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(id, "No record found");
                return Ok(LookupResult::NotFound);
            }
            Err(e) => {
                error!(id, error = %e, "Store lookup failed");
                return Err(LookupError::StoreUnavailable(e));
            }
        };

        self.write_cache(&key, &record).await;

        Ok(LookupResult::Hit {
            record,
            from_cache: false,
        })
    }

    async fn read_cache(&self, key: &str) -> Option<SpeciesRecord> {
        let payload = match self.cache.get(key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, falling back to store");
                return None;
            }
        };

        match serde_json::from_str(&payload) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(key, error = %e, "Malformed cached payload, treating as miss");
                None
            }
        }
    }

    async fn write_cache(&self, key: &str, record: &SpeciesRecord) {
        let payload = match serde_json::to_string(record) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize record for cache");
                return;
            }
        };

        match self.cache.set_with_expiry(key, &payload, self.ttl).await {
            Ok(()) => debug!(key, ttl_secs = self.ttl.as_secs(), "Cached record"),
            Err(e) => warn!(key, error = %e, "Cache write failed"),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use species_cache::{CacheError, MemoryCache};
    use species_db::{SeedSpecies, SqliteSpeciesStore};
    use std::sync::atomic::AtomicUsize;

    /// Store wrapper counting how often it is read
    pub(crate) struct CountingStore {
        inner: SqliteSpeciesStore,
        reads: AtomicUsize,
    }

    impl CountingStore {
        pub(crate) async fn seeded(records: &[(&str, &str, &str)]) -> Self {
            let inner = SqliteSpeciesStore::in_memory().await.unwrap();
            inner.migrate().await.unwrap();
            let seeds: Vec<SeedSpecies> = records
                .iter()
                .map(|(id, name, info)| SeedSpecies {
                    id: id.to_string(),
                    name: name.to_string(),
                    info: info.to_string(),
                })
                .collect();
            inner.upsert_species(&seeds).await.unwrap();
            Self {
                inner,
                reads: AtomicUsize::new(0),
            }
        }

        pub(crate) fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SpeciesStore for CountingStore {
        async fn get_species(&self, id: &str) -> species_db::Result<Option<SpeciesRecord>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get_species(id).await
        }

        async fn upsert_species(&self, records: &[SeedSpecies]) -> species_db::Result<u64> {
            self.inner.upsert_species(records).await
        }
    }

    pub(crate) struct FailingStore;

    #[async_trait]
    impl SpeciesStore for FailingStore {
        async fn get_species(&self, _id: &str) -> species_db::Result<Option<SpeciesRecord>> {
            Err(DbError::from(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "database is locked",
            )))
        }

        async fn upsert_species(&self, _records: &[SeedSpecies]) -> species_db::Result<u64> {
            Ok(0)
        }
    }

    struct FailingCache;

    fn redis_down() -> CacheError {
        CacheError::from(redis::RedisError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        )))
    }

    #[async_trait]
    impl CacheClient for FailingCache {
        async fn get(&self, _key: &str) -> species_cache::Result<Option<String>> {
            Err(redis_down())
        }

        async fn set_with_expiry(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Duration,
        ) -> species_cache::Result<()> {
            Err(redis_down())
        }
    }

    async fn setup(ttl: Duration) -> (SpeciesLookup, Arc<MemoryCache>, Arc<CountingStore>) {
        let cache = Arc::new(MemoryCache::default());
        let store = Arc::new(CountingStore::seeded(&[("1", "Species-1", "x")]).await);
        let lookup = SpeciesLookup::new(cache.clone(), store.clone(), ttl);
        (lookup, cache, store)
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("42"), "species:42");
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let (lookup, _cache, store) = setup(Duration::from_secs(30)).await;

        let first = lookup.lookup("1").await.unwrap();
        let LookupResult::Hit { record, from_cache } = first else {
            panic!("expected a hit, got {:?}", first);
        };
        assert!(!from_cache);
        assert_eq!(record.name, "Species-1");

        let second = lookup.lookup("1").await.unwrap();
        assert_eq!(
            second,
            LookupResult::Hit {
                record,
                from_cache: true
            }
        );

        // The cache hit never touched the store
        assert_eq!(store.reads(), 1);
        assert_eq!(lookup.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[tokio::test]
    async fn test_miss_populates_cache() {
        let (lookup, cache, _store) = setup(Duration::from_secs(30)).await;
        lookup.lookup("1").await.unwrap();

        let cached = cache.get("species:1").await.unwrap().unwrap();
        let record: SpeciesRecord = serde_json::from_str(&cached).unwrap();
        assert_eq!(record.id, "1");
        assert_eq!(record.info, "x");
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let (lookup, cache, store) = setup(Duration::from_secs(30)).await;

        assert_eq!(lookup.lookup("missing").await.unwrap(), LookupResult::NotFound);
        assert_eq!(lookup.lookup("missing").await.unwrap(), LookupResult::NotFound);

        assert!(cache.get("species:missing").await.unwrap().is_none());
        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let (lookup, _cache, store) = setup(Duration::from_millis(50)).await;

        lookup.lookup("1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        let result = lookup.lookup("1").await.unwrap();
        assert!(matches!(result, LookupResult::Hit { from_cache: false, .. }));
        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn test_malformed_cached_payload_falls_through() {
        let (lookup, cache, store) = setup(Duration::from_secs(30)).await;
        cache
            .set_with_expiry("species:1", "{not json", Duration::from_secs(30))
            .await
            .unwrap();

        let result = lookup.lookup("1").await.unwrap();
        assert!(matches!(result, LookupResult::Hit { from_cache: false, .. }));
        assert_eq!(store.reads(), 1);

        // The bad payload was replaced by a good one
        let again = lookup.lookup("1").await.unwrap();
        assert!(matches!(again, LookupResult::Hit { from_cache: true, .. }));
    }

    #[tokio::test]
    async fn test_cache_fault_is_a_miss() {
        let store = Arc::new(CountingStore::seeded(&[("1", "Species-1", "x")]).await);
        let lookup = SpeciesLookup::new(Arc::new(FailingCache), store.clone(), Duration::from_secs(30));

        for _ in 0..2 {
            let result = lookup.lookup("1").await.unwrap();
            assert!(matches!(result, LookupResult::Hit { from_cache: false, .. }));
        }
        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn test_store_fault_is_reported() {
        let lookup = SpeciesLookup::new(
            Arc::new(MemoryCache::default()),
            Arc::new(FailingStore),
            Duration::from_secs(30),
        );

        let err = lookup.lookup("1").await.unwrap_err();
        assert!(matches!(err, LookupError::StoreUnavailable(_)));
        assert!(err.to_string().contains("database is locked"));
    }

    #[tokio::test]
    async fn test_concurrent_misses_agree() {
        let (lookup, _cache, store) = setup(Duration::from_secs(30)).await;
        let lookup = Arc::new(lookup);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let lookup = lookup.clone();
                tokio::spawn(async move { lookup.lookup("1").await.unwrap() })
            })
            .collect();

        for task in tasks {
            match task.await.unwrap() {
                LookupResult::Hit { record, .. } => assert_eq!(record.name, "Species-1"),
                LookupResult::NotFound => panic!("record should exist"),
            }
        }
        assert!(store.reads() >= 1);
    }
}
