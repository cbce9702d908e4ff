use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::batch::RequestDescriptor;

/// Placeholder written instead of a status code when no response arrived.
pub const NO_RESPONSE_STATUS: &str = "N/A";

#[derive(Debug, Clone, Copy, Default)]
pub struct RunnerOptions {
    /// Per-request timeout; `None` waits for as long as the server takes.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub request: RequestDescriptor,
    pub response: ResponseRecord,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub status: ResponseStatus,
    pub status_text: String,
    pub data: Value,
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Code(u16),
    NotApplicable,
}

impl ResponseStatus {
    pub fn code(self) -> Option<u16> {
        match self {
            ResponseStatus::Code(code) => Some(code),
            ResponseStatus::NotApplicable => None,
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseStatus::Code(code) => write!(f, "{code}"),
            ResponseStatus::NotApplicable => f.write_str(NO_RESPONSE_STATUS),
        }
    }
}

impl Serialize for ResponseStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResponseStatus::Code(code) => serializer.serialize_u16(*code),
            ResponseStatus::NotApplicable => serializer.serialize_str(NO_RESPONSE_STATUS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    ServerError,
    TransportFailure,
}

impl ExecutionResult {
    pub fn outcome(&self) -> Outcome {
        match self.response.status {
            ResponseStatus::Code(code) if (200..300).contains(&code) => Outcome::Success,
            ResponseStatus::Code(_) => Outcome::ServerError,
            ResponseStatus::NotApplicable => Outcome::TransportFailure,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub server_errors: usize,
    pub transport_failures: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[ExecutionResult]) -> Self {
        results
            .iter()
            .fold(Self::default(), |mut summary, result| {
                summary.total += 1;
                match result.outcome() {
                    Outcome::Success => summary.succeeded += 1,
                    Outcome::ServerError => summary.server_errors += 1,
                    Outcome::TransportFailure => summary.transport_failures += 1,
                }
                summary
            })
    }
}
