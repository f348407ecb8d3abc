//! Single-writer counter service.
//!
//! One task owns every counter write for the process; callers talk to it over
//! a channel, so two downloads for the same voice can never read the same
//! value. Storage failures are retried per `RetryPolicy`; when the policy gives
//! up, the allocation falls back to a time-derived number so a download never
//! blocks on the counter.

use anyhow::{anyhow, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::retry::{run_with_retry, RetryPolicy};
use crate::store::{unix_millis, Store};

/// Largest number `set_next` accepts. Time-derived fallback numbers are
/// always above it, and the stored counter stays far from `i64::MAX`.
pub const MAX_FILE_NUMBER: i64 = 999_999_999_999;

/// A sequence number handed out for one download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub number: i64,
    /// True when the store could not be updated and the number is time-derived.
    pub fallback: bool,
}

enum Command {
    Next {
        voice: String,
        reply: oneshot::Sender<Allocation>,
    },
    Peek {
        voice: String,
        reply: oneshot::Sender<Result<i64>>,
    },
    SetNext {
        voice: String,
        next: i64,
        reply: oneshot::Sender<Result<()>>,
    },
    Reset {
        voice: String,
        reply: oneshot::Sender<Result<bool>>,
    },
}

/// Handle to the counter task. Cheap to clone.
#[derive(Clone)]
pub struct CounterService {
    tx: mpsc::Sender<Command>,
}

impl CounterService {
    /// Spawns the owning task. It stops when every handle is dropped.
    pub fn spawn(store: Store, policy: RetryPolicy, error_log_cap: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(64);
        let worker = CounterWorker {
            store,
            policy,
            error_log_cap,
        };
        let handle = tokio::spawn(worker.run(rx));
        (Self { tx }, handle)
    }

    /// Allocates the next number for `voice`.
    pub async fn next(&self, voice: &str) -> Result<Allocation> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Next {
            voice: voice.to_string(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| anyhow!("counter service dropped the request"))
    }

    /// Number the next download for `voice` will use.
    pub async fn peek_next(&self, voice: &str) -> Result<i64> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Peek {
            voice: voice.to_string(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| anyhow!("counter service dropped the request"))?
    }

    /// Makes the next download for `voice` use exactly `next`, which must be
    /// in `1..=MAX_FILE_NUMBER`.
    pub async fn set_next(&self, voice: &str, next: i64) -> Result<()> {
        if !(1..=MAX_FILE_NUMBER).contains(&next) {
            anyhow::bail!("counter must be between 1 and {}, got {}", MAX_FILE_NUMBER, next);
        }
        let (reply, rx) = oneshot::channel();
        self.send(Command::SetNext {
            voice: voice.to_string(),
            next,
            reply,
        })
        .await?;
        rx.await.map_err(|_| anyhow!("counter service dropped the request"))?
    }

    /// Clears the counter for `voice`; returns false if it was already empty.
    pub async fn reset(&self, voice: &str) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Reset {
            voice: voice.to_string(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| anyhow!("counter service dropped the request"))?
    }

    async fn send(&self, cmd: Command) -> Result<()> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| anyhow!("counter service stopped"))
    }
}

struct CounterWorker {
    store: Store,
    policy: RetryPolicy,
    error_log_cap: usize,
}

impl CounterWorker {
    async fn run(self, mut rx: mpsc::Receiver<Command>) {
        while let Some(cmd) = rx.recv().await {
            match cmd {
                Command::Next { voice, reply } => {
                    let _ = reply.send(self.allocate(&voice).await);
                }
                Command::Peek { voice, reply } => {
                    let r = self.store.last_number(&voice).await.map(|last| last.saturating_add(1));
                    let _ = reply.send(r);
                }
                Command::SetNext { voice, next, reply } => {
                    let r = self.store.set_last_number(&voice, next - 1).await;
                    if r.is_ok() {
                        tracing::info!(voice = %voice, next, "counter set");
                    }
                    let _ = reply.send(r);
                }
                Command::Reset { voice, reply } => {
                    let r = self.store.reset_counter(&voice).await;
                    let _ = reply.send(r);
                }
            }
        }
        tracing::debug!("counter service stopped");
    }

    async fn allocate(&self, voice: &str) -> Allocation {
        let store = &self.store;
        match run_with_retry(&self.policy, move || store.increment_counter(voice)).await {
            Ok(number) => Allocation {
                number,
                fallback: false,
            },
            Err(e) => {
                self.store
                    .log_error("counter update failed after retries", &e, self.error_log_cap)
                    .await;
                Allocation {
                    number: unix_millis(),
                    fallback: true,
                }
            }
        }
    }
}
