//! Random seed data for the species store

use crate::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use species_db::SeedSpecies;
use std::path::Path;
use tracing::info;

const INFO_LENGTH: usize = 100;

/// Letters, digits and a handful of spaces so the text breaks into words
const INFO_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789     ";

/// Random alphanumeric text of `len` characters, trimmed
pub fn random_info<R: Rng>(rng: &mut R, len: usize) -> String {
    let text: String = (0..len)
        .map(|_| INFO_ALPHABET[rng.gen_range(0..INFO_ALPHABET.len())] as char)
        .collect();
    text.trim().to_string()
}

/// Records `1..=count` named `Species-{i}`. A fixed `seed` makes the
/// output reproducible.
pub fn generate_species(count: usize, seed: Option<u64>) -> Vec<SeedSpecies> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    (1..=count)
        .map(|i| SeedSpecies {
            id: i.to_string(),
            name: format!("Species-{}", i),
            info: random_info(&mut rng, INFO_LENGTH),
        })
        .collect()
}

/// Write records as pretty-printed JSON, creating parent directories
pub async fn write_seed_file(path: &Path, records: &[SeedSpecies]) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            tokio::fs::create_dir_all(dir).await?;
        }
    }
    let json = serde_json::to_vec_pretty(records)?;
    tokio::fs::write(path, json).await?;
    info!(count = records.len(), path = %path.display(), "Generated species records");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_and_names() {
        let records = generate_species(3, Some(7));
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(records[2].name, "Species-3");
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        assert_eq!(generate_species(10, Some(42)), generate_species(10, Some(42)));
    }

    #[test]
    fn test_info_uses_alphabet() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let info = random_info(&mut rng, INFO_LENGTH);
            assert!(info.len() <= INFO_LENGTH);
            assert_eq!(info, info.trim());
            assert!(info.bytes().all(|b| INFO_ALPHABET.contains(&b)));
        }
    }

    #[tokio::test]
    async fn test_written_file_loads_as_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server/species_seed.json");
        let records = generate_species(5, Some(3));

        write_seed_file(&path, &records).await.unwrap();

        let loaded = species_db::seed::load_seed_file(&path).await.unwrap().unwrap();
        assert_eq!(loaded, records);
    }
}
