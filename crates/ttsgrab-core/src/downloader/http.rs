//! Single-stream HTTP GET via libcurl.
//!
//! Writes the body into a freshly created (never overwritten) file under the
//! download root and removes it again if the transfer fails.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::uniquify::create_unique;
use super::{DownloadHandle, DownloadRequest, Downloader, TransferTimedOut};

/// Downloads into `root`, renaming on collision.
pub struct CurlDownloader {
    root: PathBuf,
    next_id: AtomicU64,
}

impl CurlDownloader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            next_id: AtomicU64::new(1),
        }
    }

    fn fetch(url: &str, file: &mut File, timeout: Duration) -> Result<u64> {
        let mut written = 0u64;
        let mut write_err: Option<std::io::Error> = None;

        let mut easy = curl::easy::Easy::new();
        easy.url(url).context("invalid URL")?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(Duration::from_secs(15).min(timeout))?;
        easy.timeout(timeout)?;

        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match file.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    tracing::warn!("download write failed: {}", e);
                    write_err = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };
        if let Some(e) = write_err.take() {
            return Err(e).context("write downloaded data");
        }
        match performed {
            Err(e) if e.is_operation_timedout() => return Err(TransferTimedOut(timeout).into()),
            other => other.context("GET request failed")?,
        }

        let code = easy.response_code().context("no response code")?;
        if !(200..300).contains(&code) {
            anyhow::bail!("GET {} returned HTTP {}", url, code);
        }
        file.flush().context("flush downloaded file")?;
        Ok(written)
    }
}

impl Downloader for CurlDownloader {
    fn download(&self, request: &DownloadRequest) -> Result<DownloadHandle> {
        let target = self.root.join(&request.relative_path);
        let (mut file, path) = create_unique(&target)?;
        match Self::fetch(&request.url, &mut file, request.timeout) {
            Ok(bytes) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(id, bytes, path = %path.display(), "download finished");
                Ok(DownloadHandle { id, path })
            }
            Err(e) => {
                drop(file);
                if let Err(rm) = std::fs::remove_file(&path) {
                    tracing::warn!(path = %path.display(), "could not remove partial file: {}", rm);
                }
                Err(e)
            }
        }
    }
}
