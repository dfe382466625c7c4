//! Store adapter over the SQLite species table

use crate::error::Result;
use crate::types::{SeedSpecies, SpeciesRecord};
use crate::{migrate, species};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Durable, primary-keyed species storage
#[async_trait]
pub trait SpeciesStore: Send + Sync {
    /// Look up a species by id
    async fn get_species(&self, id: &str) -> Result<Option<SpeciesRecord>>;

    /// Upsert every record by id, returning how many were written
    async fn upsert_species(&self, records: &[SeedSpecies]) -> Result<u64>;
}

pub struct SqliteSpeciesStore {
    pool: SqlitePool,
}

impl SqliteSpeciesStore {
    /// Open (creating if needed) the database file at `db_path`
    pub async fn open(db_path: &str) -> Result<Self> {
        if let Some(dir) = Path::new(db_path).parent() {
            if !dir.as_os_str().is_empty() {
                tokio::fs::create_dir_all(dir).await?;
            }
        }

        info!(path = %db_path, "Opening SQLite database");
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            // Several instances may share one file and seed at the same time
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await?;
        info!("Database connection established");
        Ok(Self { pool })
    }

    /// Private in-memory database, used by tests and throwaway runs
    pub async fn in_memory() -> Result<Self> {
        // Every connection to `:memory:` gets its own database, so pin one
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        migrate::migrate(&self.pool).await?;
        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(species::count(&self.pool).await?)
    }
}

#[async_trait]
impl SpeciesStore for SqliteSpeciesStore {
    async fn get_species(&self, id: &str) -> Result<Option<SpeciesRecord>> {
        debug!(id, "Querying species");
        Ok(species::get_by_id(&self.pool, id).await?)
    }

    async fn upsert_species(&self, records: &[SeedSpecies]) -> Result<u64> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        for record in records {
            species::upsert(&mut *tx, record, now).await?;
        }
        tx.commit().await?;
        Ok(records.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SqliteSpeciesStore {
        let store = SqliteSpeciesStore::in_memory().await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    fn seed(id: &str, name: &str, info: &str) -> SeedSpecies {
        SeedSpecies {
            id: id.to_string(),
            name: name.to_string(),
            info: info.to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_missing_species() {
        let store = test_store().await;
        assert!(store.get_species("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_then_get() {
        let store = test_store().await;
        let written = store
            .upsert_species(&[seed("1", "Species-1", "x")])
            .await
            .unwrap();
        assert_eq!(written, 1);

        let record = store.get_species("1").await.unwrap().unwrap();
        assert_eq!(record.id, "1");
        assert_eq!(record.name, "Species-1");
        assert_eq!(record.info, "x");
        assert_eq!(record.access_count, 0);
    }

    #[tokio::test]
    async fn test_upsert_updates_fields_but_keeps_created_at() {
        let store = test_store().await;
        store
            .upsert_species(&[seed("1", "Species-1", "old")])
            .await
            .unwrap();
        let first = store.get_species("1").await.unwrap().unwrap();

        store
            .upsert_species(&[seed("1", "Renamed", "new")])
            .await
            .unwrap();
        let second = store.get_species("1").await.unwrap().unwrap();

        assert_eq!(second.name, "Renamed");
        assert_eq!(second.info, "new");
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/data/species.db");

        let store = SqliteSpeciesStore::open(path.to_str().unwrap())
            .await
            .unwrap();
        store.migrate().await.unwrap();

        assert!(path.exists());
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
