//! Error types for the load generator

use std::fmt;

#[derive(Debug)]
pub enum LoadgenError {
    Http(reqwest::Error),
    Io(Box<std::io::Error>),
    Json(serde_json::Error),
    Config(String),
}

impl fmt::Display for LoadgenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadgenError::Http(err) => write!(f, "HTTP client error: {}", err),
            LoadgenError::Io(err) => write!(f, "IO error: {}", err),
            LoadgenError::Json(err) => write!(f, "JSON error: {}", err),
            LoadgenError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for LoadgenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadgenError::Http(err) => Some(err),
            LoadgenError::Io(err) => Some(err.as_ref()),
            LoadgenError::Json(err) => Some(err),
            LoadgenError::Config(_) => None,
        }
    }
}

impl From<reqwest::Error> for LoadgenError {
    fn from(err: reqwest::Error) -> Self {
        LoadgenError::Http(err)
    }
}

impl From<std::io::Error> for LoadgenError {
    fn from(err: std::io::Error) -> Self {
        LoadgenError::Io(Box::new(err))
    }
}

impl From<serde_json::Error> for LoadgenError {
    fn from(err: serde_json::Error) -> Self {
        LoadgenError::Json(err)
    }
}

impl From<tracing_subscriber::filter::ParseError> for LoadgenError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        LoadgenError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LoadgenError>;
