//! Error types for the species store

use std::fmt;

#[derive(Debug)]
pub enum DbError {
    Database(Box<sqlx::Error>),
    Io(Box<std::io::Error>),
    /// Seed file could not be parsed
    Seed(serde_json::Error),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::Database(err) => write!(f, "Database error: {}", err),
            DbError::Io(err) => write!(f, "IO error: {}", err),
            DbError::Seed(err) => write!(f, "Invalid seed data: {}", err),
        }
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbError::Database(err) => Some(err.as_ref()),
            DbError::Io(err) => Some(err.as_ref()),
            DbError::Seed(err) => Some(err),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        DbError::Database(Box::new(err))
    }
}

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        DbError::Io(Box::new(err))
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Seed(err)
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
