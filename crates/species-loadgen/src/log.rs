//! Client-side response log
//!
//! One JSON object per line. Successful requests carry the response body
//! under `response`; failed ones carry a JSON-encoded string under `error`
//! holding `{code, message, response}`. Downstream tooling parses exactly
//! this layout, so the string-in-JSON shape is produced here and nowhere
//! else.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A request that did not produce a 2xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
    /// Response body, if the server answered at all
    #[serde(default)]
    pub response: Option<Value>,
}

impl RequestFailure {
    /// HTTP status the server reported in its body, if any
    pub fn status(&self) -> Option<u64> {
        self.response
            .as_ref()
            .and_then(|r| r.get("status"))
            .and_then(Value::as_u64)
    }

    pub fn pod(&self) -> Option<&str> {
        self.response
            .as_ref()
            .and_then(|r| r.get("pod"))
            .and_then(Value::as_str)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429) || self.message.contains("status code 429")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    Response { latency_ms: u64, body: Value },
    Failure(RequestFailure),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireEntry", try_from = "WireEntry")]
pub struct LogEntry {
    pub client: String,
    pub thread: usize,
    pub timestamp: String,
    pub id: String,
    pub outcome: RequestOutcome,
}

impl LogEntry {
    /// Pod that produced the response, `"unknown"` if there is none
    pub fn pod(&self) -> &str {
        let pod = match &self.outcome {
            RequestOutcome::Response { body, .. } => body.get("pod").and_then(Value::as_str),
            RequestOutcome::Failure(failure) => failure.pod(),
        };
        pod.unwrap_or("unknown")
    }

    pub fn from_cache(&self) -> bool {
        match &self.outcome {
            RequestOutcome::Response { body, .. } => body
                .get("fromCache")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            RequestOutcome::Failure(_) => false,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(&self.outcome, RequestOutcome::Failure(f) if f.is_rate_limited())
    }
}

/// Line layout as written to disk
#[derive(Serialize, Deserialize)]
pub struct WireEntry {
    client: String,
    #[serde(default)]
    thread: usize,
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    latency: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<LogEntry> for WireEntry {
    fn from(entry: LogEntry) -> Self {
        let (latency, response, error) = match entry.outcome {
            RequestOutcome::Response { latency_ms, body } => (Some(latency_ms), Some(body), None),
            RequestOutcome::Failure(failure) => {
                // Serializing a struct of strings and JSON values cannot fail
                let encoded = serde_json::to_string(&failure).unwrap_or_default();
                (None, None, Some(encoded))
            }
        };

        WireEntry {
            client: entry.client,
            thread: entry.thread,
            timestamp: entry.timestamp,
            id: entry.id,
            latency,
            response,
            error,
        }
    }
}

#[derive(Debug)]
pub struct MissingOutcome;

impl fmt::Display for MissingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "log entry has neither a response nor an error")
    }
}

impl TryFrom<WireEntry> for LogEntry {
    type Error = MissingOutcome;

    fn try_from(wire: WireEntry) -> Result<Self, Self::Error> {
        let outcome = match (wire.response, wire.error) {
            (Some(body), _) => RequestOutcome::Response {
                latency_ms: wire.latency.unwrap_or(0),
                body,
            },
            (None, Some(error)) => {
                let failure = serde_json::from_str(&error).unwrap_or(RequestFailure {
                    code: None,
                    message: error,
                    response: None,
                });
                RequestOutcome::Failure(failure)
            }
            (None, None) => return Err(MissingOutcome),
        };

        Ok(LogEntry {
            client: wire.client,
            thread: wire.thread,
            timestamp: wire.timestamp,
            id: wire.id,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(outcome: RequestOutcome) -> LogEntry {
        LogEntry {
            client: "client-a".to_string(),
            thread: 2,
            timestamp: "2025-05-01T10:00:00.000Z".to_string(),
            id: "4".to_string(),
            outcome,
        }
    }

    #[test]
    fn test_success_line_shape() {
        let line = serde_json::to_value(entry(RequestOutcome::Response {
            latency_ms: 12,
            body: json!({"pod": "pod-a", "fromCache": true, "data": {"id": "4"}}),
        }))
        .unwrap();

        assert_eq!(line["client"], "client-a");
        assert_eq!(line["thread"], 2);
        assert_eq!(line["latency"], 12);
        assert_eq!(line["response"]["pod"], "pod-a");
        assert!(line.get("error").is_none());
    }

    #[test]
    fn test_failure_line_embeds_json_string() {
        let line = serde_json::to_value(entry(RequestOutcome::Failure(RequestFailure {
            code: Some("ERR_BAD_REQUEST".to_string()),
            message: "Request failed with status code 429".to_string(),
            response: Some(json!({"pod": "pod-b", "status": 429, "fromCache": false})),
        })))
        .unwrap();

        assert!(line.get("response").is_none());
        assert!(line.get("latency").is_none());

        let error = line["error"].as_str().unwrap();
        let decoded: Value = serde_json::from_str(error).unwrap();
        assert_eq!(decoded["code"], "ERR_BAD_REQUEST");
        assert_eq!(decoded["response"]["status"], 429);
    }

    #[test]
    fn test_network_failure_has_null_response() {
        let line = serde_json::to_value(entry(RequestOutcome::Failure(RequestFailure {
            code: Some("ERR_NETWORK".to_string()),
            message: "connection refused".to_string(),
            response: None,
        })))
        .unwrap();

        let decoded: Value = serde_json::from_str(line["error"].as_str().unwrap()).unwrap();
        assert!(decoded["response"].is_null());
    }

    #[test]
    fn test_parse_rejected_line() {
        let line = r#"{"client":"c1","thread":0,"timestamp":"2025-05-01T10:00:00.000Z","id":"3","error":"{\"code\":\"ERR_BAD_REQUEST\",\"message\":\"Request failed with status code 429\",\"response\":{\"pod\":\"species-1\",\"timestamp\":\"2025-05-01T10:00:00.010Z\",\"fromCache\":false,\"status\":429,\"error\":\"Rate limit exceeded\"}}"}"#;

        let entry: LogEntry = serde_json::from_str(line).unwrap();
        assert_eq!(entry.client, "c1");
        assert_eq!(entry.pod(), "species-1");
        assert!(entry.is_rate_limited());
        assert!(!entry.from_cache());
    }

    #[test]
    fn test_parse_unstructured_error() {
        let line = r#"{"client":"c1","thread":0,"timestamp":"t","id":"3","error":"socket hang up"}"#;

        let entry: LogEntry = serde_json::from_str(line).unwrap();
        assert_eq!(entry.pod(), "unknown");
        assert!(!entry.is_rate_limited());
    }

    #[test]
    fn test_parse_line_without_outcome_fails() {
        let line = r#"{"client":"c1","thread":0,"timestamp":"t","id":"3"}"#;
        assert!(serde_json::from_str::<LogEntry>(line).is_err());
    }
}
