//! Types stored in and returned by the state database.

use serde::{Deserialize, Serialize};

/// Tab identifier used when the caller cannot name its tab.
pub const FALLBACK_TAB: &str = "fallback-tab";

/// One completed download request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Unix time in milliseconds.
    pub timestamp: i64,
    pub voice_name: String,
    /// Relative destination, e.g. `dictor/0001_dictor.mp3`.
    pub filename: String,
    pub file_number: i64,
}

/// One entry of the diagnostic error log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Unix time in milliseconds.
    pub timestamp: i64,
    pub message: String,
    pub detail: Option<String>,
}
