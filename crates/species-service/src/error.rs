//! Error types for the species service

use std::fmt;

#[derive(Debug)]
pub enum ServiceError {
    Config(String),
    Database(species_db::DbError),
    Cache(species_cache::CacheError),
    Io(Box<std::io::Error>),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ServiceError::Database(err) => write!(f, "{}", err),
            ServiceError::Cache(err) => write!(f, "Cache error: {}", err),
            ServiceError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Database(err) => Some(err),
            ServiceError::Cache(err) => Some(err),
            ServiceError::Io(err) => Some(err.as_ref()),
            ServiceError::Config(_) => None,
        }
    }
}

impl From<species_db::DbError> for ServiceError {
    fn from(err: species_db::DbError) -> Self {
        ServiceError::Database(err)
    }
}

impl From<species_cache::CacheError> for ServiceError {
    fn from(err: species_cache::CacheError) -> Self {
        ServiceError::Cache(err)
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for ServiceError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ServiceError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
