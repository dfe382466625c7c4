//! Species Lookup Service
//!
//! Serves species records over HTTP. Each instance sheds load with its own
//! sliding-window limiter and reads through a Redis cache in front of SQLite.

use species_cache::RedisCache;
use species_db::{seed, SqliteSpeciesStore};
use species_service::{
    start_server, AdmissionController, Config, Pipeline, Result, ServerState, ServiceError,
    SharedState, SpeciesLookup,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("species_service=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting species lookup service...");

    // Load configuration from environment
    let config = Config::from_env()?;
    info!("Pod: {}", config.pod_name);
    info!("Port: {}", config.port);
    info!("Request limit: {} per 60s", config.request_limit);
    info!("Cache TTL: {} seconds", config.cache_ttl.as_secs());

    let cache = RedisCache::connect(&config.redis_url).await?;

    let store = SqliteSpeciesStore::open(&config.db_path).await?;
    store.migrate().await?;
    seed::seed_from_file(&store, &config.seed_file).await?;

    let lookup = SpeciesLookup::new(Arc::new(cache), Arc::new(store), config.cache_ttl);
    let admission = AdmissionController::new(config.request_limit);
    let pipeline = Pipeline::new(config.pod_name, admission, lookup);

    // Create shared state
    let state: SharedState = Arc::new(ServerState::new(pipeline));

    // Start HTTP server (blocking)
    start_server(state, config.port)
        .await
        .map_err(|e| ServiceError::Config(format!("Server error: {}", e)))?;

    info!("Species lookup service stopped");
    Ok(())
}
