//! Error types for cache adapters

use std::fmt;

#[derive(Debug)]
pub enum CacheError {
    /// Redis connection or command failure
    Redis(Box<::redis::RedisError>),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Redis(err) => write!(f, "Redis error: {}", err),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Redis(err) => Some(err.as_ref()),
        }
    }
}

impl From<::redis::RedisError> for CacheError {
    fn from(err: ::redis::RedisError) -> Self {
        CacheError::Redis(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
