//! Counts audio links appearing in inserted content, batched with a debounce.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::url_model::looks_like_audio;

pub fn count_audio_links<S: AsRef<str>>(hrefs: &[S]) -> usize {
    hrefs.iter().filter(|h| looks_like_audio(h.as_ref())).count()
}

/// Feed of hrefs from inserted nodes. Cheap to clone.
#[derive(Clone)]
pub struct LinkDiscovery {
    tx: mpsc::UnboundedSender<Vec<String>>,
    seen: Arc<AtomicU64>,
}

impl LinkDiscovery {
    /// Starts the batching task. A batch closes once `window` passes with no
    /// new insertions.
    pub fn spawn(window: Duration) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let seen = Arc::new(AtomicU64::new(0));
        let handle = tokio::spawn(run(rx, window, Arc::clone(&seen)));
        (Self { tx, seen }, handle)
    }

    /// Reports the hrefs of links found in one inserted subtree.
    pub fn observe(&self, hrefs: Vec<String>) {
        if self.tx.send(hrefs).is_err() {
            tracing::debug!("link discovery stopped; insertion ignored");
        }
    }

    /// Audio links reported so far, across all closed batches.
    pub fn total_seen(&self) -> u64 {
        self.seen.load(Ordering::Relaxed)
    }

    /// Stops feeding the batching task, waits for its last batch to close and
    /// returns the final total. Other clones must already be dropped.
    pub async fn close(self, worker: JoinHandle<()>) -> u64 {
        let seen = Arc::clone(&self.seen);
        drop(self);
        if let Err(e) = worker.await {
            tracing::warn!("link discovery task failed: {}", e);
        }
        seen.load(Ordering::Relaxed)
    }
}

async fn run(mut rx: mpsc::UnboundedReceiver<Vec<String>>, window: Duration, seen: Arc<AtomicU64>) {
    while let Some(first) = rx.recv().await {
        let mut found = count_audio_links(&first);
        while let Ok(Some(batch)) = tokio::time::timeout(window, rx.recv()).await {
            found += count_audio_links(&batch);
        }
        if found > 0 {
            tracing::info!("found {} new audio links", found);
            seen.fetch_add(found as u64, Ordering::Relaxed);
        }
    }
}
