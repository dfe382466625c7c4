use crate::error::{Result, ServiceError};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Service configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Admitted requests per 60 second window, per instance
    pub request_limit: usize,
    pub cache_ttl: Duration,
    pub redis_url: String,
    pub db_path: String,
    /// Instance identifier stamped on every response
    pub pod_name: String,
    pub seed_file: PathBuf,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or(&lookup, "PORT", 3000);
        let request_limit = parse_or(&lookup, "REQUEST_LIMIT", 100);
        let cache_ttl = Duration::from_secs(parse_or(&lookup, "CACHE_TTL", 30));

        let redis_url = required(&lookup, "REDIS_URL")?;
        let db_path = required(&lookup, "DB_PATH")?;

        let pod_name = lookup("HOSTNAME")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        let seed_file = lookup("SEED_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("species_seed.json"));

        Ok(Self {
            port,
            request_limit,
            cache_ttl,
            redis_url,
            db_path,
            pod_name,
            seed_file,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::Config(format!("{} environment variable is required", key)))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, default = %default, "Invalid value, using default");
            default
        }),
        None => default,
    }
}
