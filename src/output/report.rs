//! Machine-readable run report
//!
//! A run prints exactly one JSON object on stdout, either the summary or an
//! error. Field names match what the dashboard's sync endpoint consumes.

use serde::Serialize;

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub linked: usize,
    #[serde(rename = "linkErrors")]
    pub link_errors: usize,
    #[serde(rename = "newInRedconar")]
    pub new_in_remote: usize,
    #[serde(rename = "missingInRedconar")]
    pub missing_in_remote: usize,
    #[serde(rename = "totalDb")]
    pub total_local: usize,
    #[serde(rename = "totalRedconar")]
    pub total_remote: usize,
    /// Returned so the caller can reuse the session on the next run
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// A failed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub error: String,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Serializes a report as a single line of JSON
pub fn to_json_line<T: Serialize>(report: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}
