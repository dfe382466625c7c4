//! Request pipeline: admission, then retrieval, then response shaping

use crate::admission::{Admission, AdmissionController};
use crate::lookup::{LookupResult, SpeciesLookup};
use crate::types::ResponseEnvelope;
use axum::http::StatusCode;
use chrono::{SecondsFormat, Utc};

/// What happened to a request, independent of its wire representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Hit { from_cache: bool },
    NotFound,
    Rejected,
    StoreUnavailable,
}

impl Outcome {
    pub fn status(self) -> StatusCode {
        match self {
            Outcome::Hit { .. } => StatusCode::OK,
            Outcome::NotFound => StatusCode::NOT_FOUND,
            Outcome::Rejected => StatusCode::TOO_MANY_REQUESTS,
            Outcome::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_message(self) -> Option<&'static str> {
        match self {
            Outcome::Hit { .. } => None,
            Outcome::NotFound => Some("Species not found"),
            Outcome::Rejected => Some("Rate limit exceeded"),
            Outcome::StoreUnavailable => Some("Species store unavailable"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineResponse {
    pub outcome: Outcome,
    pub status: StatusCode,
    pub envelope: ResponseEnvelope,
}

pub struct Pipeline {
    pod: String,
    admission: AdmissionController,
    lookup: SpeciesLookup,
}

impl Pipeline {
    pub fn new(pod: String, admission: AdmissionController, lookup: SpeciesLookup) -> Self {
        Self {
            pod,
            admission,
            lookup,
        }
    }

    pub fn pod(&self) -> &str {
        &self.pod
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    pub fn lookup(&self) -> &SpeciesLookup {
        &self.lookup
    }

    /// Handle one `GET /species/{id}`
    pub async fn handle(&self, id: &str) -> PipelineResponse {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        if self.admission.admit_now() == Admission::Rejected {
            return self.failure(Outcome::Rejected, timestamp);
        }

        match self.lookup.lookup(id).await {
            Ok(LookupResult::Hit { record, from_cache }) => {
                let outcome = Outcome::Hit { from_cache };
                PipelineResponse {
                    outcome,
                    status: outcome.status(),
                    envelope: ResponseEnvelope {
                        pod: self.pod.clone(),
                        timestamp,
                        from_cache,
                        status: None,
                        data: Some(record),
                        error: None,
                    },
                }
            }
            Ok(LookupResult::NotFound) => self.failure(Outcome::NotFound, timestamp),
            Err(_) => self.failure(Outcome::StoreUnavailable, timestamp),
        }
    }

    fn failure(&self, outcome: Outcome, timestamp: String) -> PipelineResponse {
        let status = outcome.status();
        PipelineResponse {
            outcome,
            status,
            envelope: ResponseEnvelope {
                pod: self.pod.clone(),
                timestamp,
                from_cache: false,
                status: Some(status.as_u16()),
                data: None,
                error: outcome.error_message().map(str::to_string),
            },
        }
    }
}
