//! Runs one allocated download: fetch, then history, then notification.

use anyhow::anyhow;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::error::DownloadError;
use crate::downloader::{DownloadHandle, DownloadRequest, Downloader, TransferTimedOut};
use crate::notify::{Notice, Notifier};
use crate::store::{unix_millis, HistoryEntry, Store};

/// A download whose number and filename are already fixed.
#[derive(Debug, Clone)]
pub(crate) struct Job {
    pub url: String,
    pub voice: String,
    pub number: i64,
    pub filename: String,
}

#[derive(Clone)]
pub(crate) struct Dispatcher {
    pub store: Store,
    pub downloader: Arc<dyn Downloader>,
    pub notifier: Notifier,
    pub timeout: Duration,
    pub history_retention: usize,
    pub error_log_limit: usize,
}

impl Dispatcher {
    pub async fn run(&self, job: &Job) -> Result<DownloadHandle, DownloadError> {
        match self.fetch(job).await {
            Ok(handle) => {
                tracing::info!(
                    id = handle.id,
                    path = %handle.path.display(),
                    "downloaded {}",
                    job.filename
                );
                self.record(job).await;
                self.notifier.notify(Notice::Downloaded(job.filename.clone()));
                Ok(handle)
            }
            Err(e) => {
                let err = anyhow!("{}", e).context(format!("download {} -> {}", job.url, job.filename));
                self.store
                    .log_error("download failed", &err, self.error_log_limit)
                    .await;
                self.notifier.notify(Notice::Failed(job.filename.clone()));
                Err(e)
            }
        }
    }

    async fn fetch(&self, job: &Job) -> Result<DownloadHandle, DownloadError> {
        let request = DownloadRequest {
            url: job.url.clone(),
            relative_path: PathBuf::from(&job.filename),
            timeout: self.timeout,
        };
        let downloader = Arc::clone(&self.downloader);
        let task = tokio::task::spawn_blocking(move || downloader.download(&request));
        // The blocking transfer keeps running after a timeout; its own timeout ends it.
        // Whichever deadline fires first, the caller sees a timeout.
        match tokio::time::timeout(self.timeout, task).await {
            Err(_) => Err(DownloadError::Timeout(self.timeout)),
            Ok(Err(join)) => Err(DownloadError::Failed(anyhow!("download task panicked: {}", join))),
            Ok(Ok(Err(e))) if e.downcast_ref::<TransferTimedOut>().is_some() => {
                Err(DownloadError::Timeout(self.timeout))
            }
            Ok(Ok(Err(e))) => Err(DownloadError::Failed(e)),
            Ok(Ok(Ok(handle))) => Ok(handle),
        }
    }

    async fn record(&self, job: &Job) {
        let entry = HistoryEntry {
            timestamp: unix_millis(),
            voice_name: job.voice.clone(),
            filename: job.filename.clone(),
            file_number: job.number,
        };
        if let Err(e) = self
            .store
            .append_history(&entry, self.history_retention)
            .await
        {
            self.store
                .log_error("could not save download history", &e, self.error_log_limit)
                .await;
        }
    }
}
