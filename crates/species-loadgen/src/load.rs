//! Concurrent load generator
//!
//! Each worker picks a random species id, issues one lookup, appends the
//! result to the response log and sleeps for its share of the configured
//! per-worker rate.

use crate::error::{LoadgenError, Result};
use crate::log::{LogEntry, RequestFailure, RequestOutcome};
use chrono::{SecondsFormat, Utc};
use rand::seq::SliceRandom;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, watch};
use tokio::time;
use tracing::{debug, info, warn};

/// Header the service reads the caller identity from
pub const CLIENT_HEADER: &str = "x-client-name";

#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub threads: usize,
    /// Requests per minute, per worker
    pub rate: f64,
    pub species_ids: Vec<String>,
    pub server_url: String,
    pub output_file: PathBuf,
    pub client_name: String,
    /// Stop after this long; run until cancelled when `None`
    pub duration: Option<Duration>,
    /// Per-request timeout, reported as `ECONNABORTED` when hit
    pub timeout: Duration,
}

impl LoadConfig {
    fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(LoadgenError::Config("THREADS must be at least 1".to_string()));
        }
        if !(self.rate.is_finite() && self.rate > 0.0) {
            return Err(LoadgenError::Config("RATE must be a positive number".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(LoadgenError::Config("Request timeout must be positive".to_string()));
        }
        if self.species_ids.is_empty() {
            return Err(LoadgenError::Config("SPECIES_IDS must not be empty".to_string()));
        }
        Ok(())
    }

    /// Pause between two requests of one worker
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.rate)
    }
}

/// Map an HTTP status to the error code recorded for it
pub fn error_code(status: StatusCode) -> &'static str {
    if status.is_server_error() {
        "ERR_BAD_RESPONSE"
    } else {
        "ERR_BAD_REQUEST"
    }
}

/// Run all workers until `duration` elapses or `shutdown` resolves,
/// returning the number of requests issued.
///
/// Workers finish their in-flight request before stopping and every
/// recorded line is flushed to the log before this returns.
pub async fn run<F>(config: LoadConfig, shutdown: F) -> Result<u64>
where
    F: Future<Output = ()> + Send + 'static,
{
    config.validate()?;
    info!(
        client = %config.client_name,
        threads = config.threads,
        rate = config.rate,
        "Starting load generator"
    );

    let client = Client::builder().timeout(config.timeout).build()?;

    let file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.output_file)
        .await?;

    let (line_tx, line_rx) = mpsc::channel::<String>(1000);
    let writer = tokio::spawn(write_lines(file, line_rx));

    let (stop_tx, stop_rx) = watch::channel(false);
    let deadline = config.duration.map(|d| time::Instant::now() + d);
    let stopper = tokio::spawn(async move {
        let expired = async {
            match deadline {
                Some(deadline) => time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            _ = shutdown => info!("Interrupted, stopping load generator"),
            _ = expired => debug!("Run duration elapsed"),
        }
        let _ = stop_tx.send(true);
    });

    let config = Arc::new(config);
    let workers: Vec<_> = (0..config.threads)
        .map(|thread| {
            let worker = Worker {
                thread,
                client: client.clone(),
                config: config.clone(),
                lines: line_tx.clone(),
            };
            tokio::spawn(worker.run(stop_rx.clone()))
        })
        .collect();
    drop(line_tx);

    let mut issued = 0;
    for worker in workers {
        match worker.await {
            Ok(count) => issued += count,
            Err(e) => warn!(error = %e, "Worker task failed"),
        }
    }
    stopper.abort();

    // All senders are gone, so the writer exits once the channel is drained
    match writer.await {
        Ok(result) => result?,
        Err(e) => warn!(error = %e, "Log writer task failed"),
    }

    info!(issued, "Load generator finished");
    Ok(issued)
}

async fn write_lines(mut file: tokio::fs::File, mut lines: mpsc::Receiver<String>) -> Result<()> {
    while let Some(mut line) = lines.recv().await {
        line.push('\n');
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
    }
    Ok(())
}

struct Worker {
    thread: usize,
    client: Client,
    config: Arc<LoadConfig>,
    lines: mpsc::Sender<String>,
}

impl Worker {
    async fn run(self, mut stop: watch::Receiver<bool>) -> u64 {
        let interval = self.config.interval();
        let mut issued = 0;

        while !*stop.borrow_and_update() {
            let id = {
                let mut rng = rand::thread_rng();
                self.config
                    .species_ids
                    .choose(&mut rng)
                    .cloned()
                    .unwrap_or_default()
            };

            let entry = self.request(id).await;
            issued += 1;

            match serde_json::to_string(&entry) {
                Ok(line) => {
                    if self.lines.send(line).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!(error = %e, "Failed to encode log entry"),
            }

            tokio::select! {
                _ = time::sleep(interval) => {}
                _ = stop.changed() => break,
            }
        }
        issued
    }

    async fn request(&self, id: String) -> LogEntry {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let url = format!(
            "{}/species/{}",
            self.config.server_url.trim_end_matches('/'),
            id
        );

        let started = Instant::now();
        let outcome = match self
            .client
            .get(&url)
            .header(CLIENT_HEADER, &self.config.client_name)
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status();
                let body = response.json::<Value>().await.unwrap_or(Value::Null);
                if status.is_success() {
                    RequestOutcome::Response {
                        latency_ms: started.elapsed().as_millis() as u64,
                        body,
                    }
                } else {
                    RequestOutcome::Failure(RequestFailure {
                        code: Some(error_code(status).to_string()),
                        message: format!("Request failed with status code {}", status.as_u16()),
                        response: Some(body),
                    })
                }
            }
            Err(e) => {
                let code = if e.is_timeout() {
                    "ECONNABORTED"
                } else {
                    "ERR_NETWORK"
                };
                RequestOutcome::Failure(RequestFailure {
                    code: Some(code.to_string()),
                    message: e.to_string(),
                    response: None,
                })
            }
        };

        LogEntry {
            client: self.config.client_name.clone(),
            thread: self.thread,
            timestamp,
            id,
            outcome,
        }
    }
}
