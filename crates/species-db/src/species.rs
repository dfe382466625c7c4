use crate::types::{SeedSpecies, SpeciesRecord};
use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

/// Get a species by primary key
pub async fn get_by_id(pool: &SqlitePool, id: &str) -> Result<Option<SpeciesRecord>, sqlx::Error> {
    sqlx::query_as::<_, SpeciesRecord>(
        "SELECT id, name, info, created_at, count FROM species WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Insert a species, or update name and info if the id already exists.
/// `created_at` is only written on first insert.
pub async fn upsert<'e, E>(executor: E, s: &SeedSpecies, now: DateTime<Utc>) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO species (id, name, info, created_at)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT (id) DO UPDATE SET
            name = excluded.name,
            info = excluded.info
        "#,
    )
    .bind(&s.id)
    .bind(&s.name)
    .bind(&s.info)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Total number of stored species
pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM species")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
