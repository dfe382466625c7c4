//! One-time startup seeding from a JSON record list

use crate::error::Result;
use crate::store::SpeciesStore;
use crate::types::SeedSpecies;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Read a seed file. A missing file is not an error and yields `None`.
pub async fn load_seed_file(path: &Path) -> Result<Option<Vec<SeedSpecies>>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Upsert `records` into the store. Re-running with the same input leaves
/// the store unchanged.
pub async fn seed(store: &dyn SpeciesStore, records: &[SeedSpecies]) -> Result<u64> {
    let count = store.upsert_species(records).await?;
    info!(count, "Seeded species records");
    Ok(count)
}

/// Seed from `path` if it exists; returns the number of records written
pub async fn seed_from_file(store: &dyn SpeciesStore, path: &Path) -> Result<u64> {
    match load_seed_file(path).await? {
        Some(records) => {
            info!(path = %path.display(), "Seeding species data");
            seed(store, &records).await
        }
        None => {
            warn!(path = %path.display(), "No seed file found");
            Ok(0)
        }
    }
}
