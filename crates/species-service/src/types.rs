//! Wire types for the species service

use serde::{Deserialize, Serialize};
use species_db::SpeciesRecord;

/// Body of every `/species/{id}` response, success or failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub pod: String,
    pub timestamp: String,
    pub from_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SpeciesRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub pod: String,
    pub uptime_secs: u64,
    pub request_limit: usize,
    pub window_size: usize,
    pub cache: CacheStats,
}
