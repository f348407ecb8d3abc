//! FIFO download queue with a minimum spacing between dispatches.
//!
//! Direct downloads and queued ones share the same dispatch clock: a request
//! goes straight through only when nothing is waiting and the previous
//! dispatch is at least `spacing` old. Everything else waits in order.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::dispatch::{Dispatcher, Job};
use std::sync::Arc;

#[derive(Default)]
struct Slot {
    depth: usize,
    last_dispatch: Option<Instant>,
}

struct Clock {
    slot: Mutex<Slot>,
    spacing: Duration,
}

impl Clock {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Time left before the next dispatch may start, or None once claimed.
    fn claim_for_worker(&self) -> Option<Duration> {
        let mut slot = self.lock();
        let now = Instant::now();
        if let Some(last) = slot.last_dispatch {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.spacing {
                return Some(self.spacing - elapsed);
            }
        }
        slot.last_dispatch = Some(now);
        slot.depth = slot.depth.saturating_sub(1);
        None
    }
}

pub(crate) struct DownloadQueue {
    tx: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    clock: Arc<Clock>,
    worker: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl DownloadQueue {
    pub fn spawn(dispatcher: Dispatcher, spacing: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let clock = Arc::new(Clock {
            slot: Mutex::new(Slot::default()),
            spacing,
        });
        let worker = tokio::spawn(run_worker(Arc::clone(&clock), dispatcher, rx));
        Self {
            tx: Mutex::new(Some(tx)),
            clock,
            worker: tokio::sync::Mutex::new(Some(worker)),
        }
    }

    /// Claims the dispatch slot for an immediate download.
    /// False means the caller must enqueue instead.
    pub fn try_claim(&self) -> bool {
        let mut slot = self.clock.lock();
        if slot.depth > 0 {
            return false;
        }
        let now = Instant::now();
        if let Some(last) = slot.last_dispatch {
            if now.saturating_duration_since(last) < self.clock.spacing {
                return false;
            }
        }
        slot.last_dispatch = Some(now);
        true
    }

    /// Appends `job` and returns the new depth. Gives the job back after shutdown.
    pub fn push(&self, job: Job) -> Result<usize, Job> {
        let tx = self.tx.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(tx) = tx.as_ref() else {
            return Err(job);
        };
        let mut slot = self.clock.lock();
        match tx.send(job) {
            Ok(()) => {
                slot.depth += 1;
                Ok(slot.depth)
            }
            Err(mpsc::error::SendError(job)) => Err(job),
        }
    }

    /// Downloads waiting to be dispatched.
    pub fn depth(&self) -> usize {
        self.clock.lock().depth
    }

    /// Stops accepting jobs and waits for the queued ones to finish.
    pub async fn shutdown(&self) {
        let tx = self
            .tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        drop(tx);
        if let Some(worker) = self.worker.lock().await.take() {
            if let Err(e) = worker.await {
                tracing::warn!("download queue worker ended abnormally: {}", e);
            }
        }
    }
}

async fn run_worker(clock: Arc<Clock>, dispatcher: Dispatcher, mut rx: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = rx.recv().await {
        while let Some(wait) = clock.claim_for_worker() {
            tokio::time::sleep(wait).await;
        }
        tracing::debug!(filename = %job.filename, "dispatching queued download");
        if let Err(e) = dispatcher.run(&job).await {
            tracing::warn!(reason = %e.reason(), "queued download failed: {}", e);
        }
    }
    tracing::debug!("download queue drained");
}
