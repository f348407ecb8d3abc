//! Request/response messages exchanged with the orchestrator (JSON, `action` tag).

use serde::{Deserialize, Serialize};

use crate::store::HistoryEntry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    #[serde(rename_all = "camelCase")]
    DownloadFile {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tab_id: Option<String>,
    },
    UpdateExtensionState {
        enabled: bool,
    },
    ToggleExtension,
    #[serde(rename_all = "camelCase")]
    GetCounter {
        voice_name: String,
    },
    #[serde(rename_all = "camelCase")]
    SetCounter {
        voice_name: String,
        number: i64,
    },
    #[serde(rename_all = "camelCase")]
    ResetCounter {
        voice_name: String,
    },
    GetHistory,
    ClearHistory,
    GetStats,
}

/// Machine-readable failure code carried in `Response::reason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reason {
    Disabled,
    InvalidUrl,
    InvalidNumber,
    DownloadTimeout,
    DownloadFailed,
    StorageError,
    Unsupported,
    UnknownAction,
}

impl Reason {
    /// Rejections after which the interceptor lets the browser download natively.
    pub fn allows_native_fallback(self) -> bool {
        matches!(self, Reason::Disabled | Reason::InvalidUrl)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Reason::Disabled => "disabled",
            Reason::InvalidUrl => "invalid-url",
            Reason::InvalidNumber => "invalid-number",
            Reason::DownloadTimeout => "download-timeout",
            Reason::DownloadFailed => "download-failed",
            Reason::StorageError => "storage-error",
            Reason::Unsupported => "unsupported",
            Reason::UnknownAction => "unknown-action",
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate counts for `getStats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_downloads: u64,
    /// Downloads in the last 24 hours.
    pub today_downloads: u64,
    pub total_voices: u64,
    pub storage_used: u64,
    pub queue_depth: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queued: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn rejected(reason: Reason) -> Self {
        Self {
            success: false,
            reason: Some(reason),
            ..Self::default()
        }
    }
}
