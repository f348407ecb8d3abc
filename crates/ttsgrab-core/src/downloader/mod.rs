//! Download backends.
//!
//! The orchestrator only needs "fetch this URL to this relative path, renaming
//! on collision, and tell me where it went". `CurlDownloader` does that with
//! libcurl; tests substitute their own `Downloader`.

mod http;
mod uniquify;

pub use http::CurlDownloader;
pub use uniquify::create_unique;

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

/// One file to fetch.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    /// Destination relative to the download root, e.g. `dictor/0001_dictor.mp3`.
    pub relative_path: PathBuf,
    /// Upper bound for the whole transfer.
    pub timeout: Duration,
}

/// Identifies a finished download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadHandle {
    pub id: u64,
    /// Where the file actually landed (may differ from the request after renaming).
    pub path: PathBuf,
}

/// The transfer ran past its deadline. Backends return this (wrapped in
/// `anyhow::Error`) so callers can tell a stall apart from other failures.
#[derive(Debug, thiserror::Error)]
#[error("transfer timed out after {0:?}")]
pub struct TransferTimedOut(pub Duration);

/// A blocking download backend. Called from `spawn_blocking`.
pub trait Downloader: Send + Sync + 'static {
    fn download(&self, request: &DownloadRequest) -> Result<DownloadHandle>;
}
