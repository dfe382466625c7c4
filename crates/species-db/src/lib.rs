pub mod error;
pub mod migrate;
pub mod seed;
pub mod species;
pub mod store;
pub mod types;

pub use error::{DbError, Result};
pub use sqlx::sqlite::SqlitePool;
pub use store::{SpeciesStore, SqliteSpeciesStore};
pub use types::*;
