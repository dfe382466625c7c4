//! HTTP server for species lookups
//!
//! Provides /health and /species/{id} endpoints.

use crate::pipeline::Pipeline;
use crate::types::HealthResponse;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Header load generators use to identify themselves in request logs
pub const CLIENT_HEADER: &str = "x-client-name";

/// Shared state for the HTTP server
pub struct ServerState {
    pub pipeline: Pipeline,
    /// Monotonic, so uptime never goes backwards with the wall clock
    pub started_at: Instant,
}

impl ServerState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            started_at: Instant::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/species/{id}", get(get_species))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server, returning once a shutdown signal is received
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime_secs = state.started_at.elapsed().as_secs();
    let pipeline = &state.pipeline;

    Json(HealthResponse {
        status: "ok".to_string(),
        pod: pipeline.pod().to_string(),
        uptime_secs,
        request_limit: pipeline.admission().limit(),
        window_size: pipeline.admission().window_len(),
        cache: pipeline.lookup().stats(),
    })
}

/// Look up a species by id
async fn get_species(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let started = Instant::now();
    let client = headers
        .get(CLIENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("anonymous");

    let response = state.pipeline.handle(&id).await;

    info!(
        target: "species_service::requests",
        client,
        pod = %state.pipeline.pod(),
        id = %id,
        status = response.status.as_u16(),
        outcome = ?response.outcome,
        from_cache = response.envelope.from_cache,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request handled"
    );

    (response.status, Json(response.envelope)).into_response()
}
