//! Aggregate statistics over a response log

use crate::error::Result;
use crate::log::LogEntry;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PodCacheStats {
    pub total: u64,
    pub hits: u64,
    pub hit_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_requests: u64,
    pub total_429_errors: u64,
    pub cache_hit_rate: f64,
    pub requests_per_client: BTreeMap<String, u64>,
    #[serde(rename = "429s_per_client")]
    pub rate_limited_per_client: BTreeMap<String, u64>,
    #[serde(rename = "429s_per_pod")]
    pub rate_limited_per_pod: BTreeMap<String, u64>,
    pub cache_stats_per_pod: BTreeMap<String, PodCacheStats>,
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let value = part as f64 / whole as f64;
    (value * 10_000.0).round() / 10_000.0
}

pub fn summarize<'a, I>(entries: I) -> Summary
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut summary = Summary::default();
    let mut cache_hits = 0;

    for entry in entries {
        let pod = entry.pod().to_string();
        summary.total_requests += 1;
        *summary
            .requests_per_client
            .entry(entry.client.clone())
            .or_default() += 1;

        if entry.is_rate_limited() {
            summary.total_429_errors += 1;
            *summary
                .rate_limited_per_client
                .entry(entry.client.clone())
                .or_default() += 1;
            *summary
                .rate_limited_per_pod
                .entry(pod.clone())
                .or_default() += 1;
        }

        let stats = summary.cache_stats_per_pod.entry(pod).or_default();
        stats.total += 1;
        if entry.from_cache() {
            stats.hits += 1;
            cache_hits += 1;
        }
    }

    for stats in summary.cache_stats_per_pod.values_mut() {
        stats.hit_rate = ratio(stats.hits, stats.total);
    }
    summary.cache_hit_rate = ratio(cache_hits, summary.total_requests);
    summary
}

/// Parse log text line by line, skipping blank and unparseable lines
pub fn parse_log(text: &str) -> Vec<LogEntry> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "Skipping unparseable log line");
                None
            }
        })
        .collect()
}

/// Summarize the log at `input` and write the result as JSON to `output`
pub async fn summarize_file(input: &Path, output: &Path) -> Result<Summary> {
    let text = tokio::fs::read_to_string(input).await?;
    let entries = parse_log(&text);
    let summary = summarize(&entries);

    tokio::fs::write(output, serde_json::to_vec_pretty(&summary)?).await?;
    info!(
        requests = summary.total_requests,
        rate_limited = summary.total_429_errors,
        path = %output.display(),
        "Summary written"
    );
    Ok(summary)
}
