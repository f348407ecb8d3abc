//! Download orchestrator.
//!
//! Owns the enabled flag, URL validation, voice resolution, counter
//! allocation and the actual download. Every caller (interceptor, panel,
//! control socket) talks to it with `Request` values and gets a `Response`.

mod dispatch;
mod error;
mod message;
mod queue;

#[cfg(test)]
mod tests;

pub use error::DownloadError;
pub use message::{Reason, Request, Response, Stats};

use anyhow::Result;
use std::sync::Arc;

use crate::config::{FeatureConfig, LimitsConfig, TtsGrabConfig};
use crate::counter::{CounterService, MAX_FILE_NUMBER};
use crate::downloader::Downloader;
use crate::notify::{Notice, Notifier};
use crate::state::EnabledState;
use crate::store::{unix_millis, Store, FALLBACK_TAB};
use crate::url_model::{compose_filename, sanitize_voice_name, UrlPolicy};
use dispatch::{Dispatcher, Job};
use queue::DownloadQueue;

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Cheap to clone; all clones share one queue and counter service.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    store: Store,
    state: EnabledState,
    counters: CounterService,
    dispatcher: Dispatcher,
    queue: Option<DownloadQueue>,
    policy: UrlPolicy,
    notifier: Notifier,
    default_voice: String,
    features: FeatureConfig,
    limits: LimitsConfig,
}

impl Orchestrator {
    /// Loads the enabled flag and starts the counter service (and the queue
    /// worker when queueing is on). Must run inside a Tokio runtime.
    pub async fn start(cfg: &TtsGrabConfig, store: Store, downloader: Arc<dyn Downloader>) -> Self {
        let state = EnabledState::load(store.clone(), cfg.enabled_by_default).await;
        let (counters, _worker) =
            CounterService::spawn(store.clone(), cfg.retry.policy(), cfg.limits.error_log_limit);
        let notifier = Notifier::new(cfg.features.notifications);
        let dispatcher = Dispatcher {
            store: store.clone(),
            downloader,
            notifier: notifier.clone(),
            timeout: cfg.timing.download_timeout(),
            history_retention: cfg.limits.history_retention,
            error_log_limit: cfg.limits.error_log_limit,
        };
        let queue = cfg
            .features
            .queueing
            .then(|| DownloadQueue::spawn(dispatcher.clone(), cfg.timing.rate_limit()));

        tracing::info!(
            enabled = state.get(),
            queueing = cfg.features.queueing,
            notifications = cfg.features.notifications,
            "orchestrator started"
        );

        Self {
            inner: Arc::new(Inner {
                store,
                state,
                counters,
                dispatcher,
                queue,
                policy: UrlPolicy::from_config(&cfg.urls),
                notifier,
                default_voice: cfg.default_voice.clone(),
                features: cfg.features.clone(),
                limits: cfg.limits.clone(),
            }),
        }
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    pub fn enabled_state(&self) -> &EnabledState {
        &self.inner.state
    }

    pub fn features(&self) -> &FeatureConfig {
        &self.inner.features
    }

    pub fn queue_depth(&self) -> usize {
        self.inner.queue.as_ref().map_or(0, |q| q.depth())
    }

    /// Answers one request. Never fails: problems become `success: false`.
    pub async fn handle(&self, request: Request) -> Response {
        tracing::debug!(?request, "request");
        match request {
            Request::DownloadFile { url, tab_id } => {
                match self.download(&url, tab_id.as_deref()).await {
                    Ok(response) => response,
                    Err(e) => {
                        if e.is_critical() {
                            tracing::warn!(reason = %e.reason(), "download rejected: {}", e);
                        } else {
                            tracing::debug!(reason = %e.reason(), "download rejected: {}", e);
                        }
                        Response::rejected(e.reason())
                    }
                }
            }
            Request::UpdateExtensionState { enabled } => {
                match self.inner.state.set(enabled).await {
                    Ok(()) => Response {
                        enabled: Some(enabled),
                        ..Response::ok()
                    },
                    Err(e) => self.storage_failure("could not save enabled flag", e).await,
                }
            }
            Request::ToggleExtension => {
                if !self.inner.features.context_menu {
                    return Response::rejected(Reason::Unsupported);
                }
                match self.inner.state.toggle().await {
                    Ok(enabled) => Response {
                        enabled: Some(enabled),
                        ..Response::ok()
                    },
                    Err(e) => self.storage_failure("could not toggle extension", e).await,
                }
            }
            Request::GetCounter { voice_name } => {
                let voice = self.voice_key(&voice_name);
                match self.inner.counters.peek_next(&voice).await {
                    Ok(next) => Response {
                        counter: Some(next),
                        ..Response::ok()
                    },
                    Err(e) => self.storage_failure("could not read counter", e).await,
                }
            }
            Request::SetCounter { voice_name, number } => {
                if !(1..=MAX_FILE_NUMBER).contains(&number) {
                    return Response::rejected(Reason::InvalidNumber);
                }
                let voice = self.voice_key(&voice_name);
                match self.inner.counters.set_next(&voice, number).await {
                    Ok(()) => Response {
                        counter: Some(number),
                        ..Response::ok()
                    },
                    Err(e) => self.storage_failure("could not set counter", e).await,
                }
            }
            Request::ResetCounter { voice_name } => {
                let voice = self.voice_key(&voice_name);
                match self.inner.counters.reset(&voice).await {
                    Ok(reset) => {
                        tracing::info!(voice = %voice, reset, "counter reset");
                        Response {
                            reset: Some(reset),
                            ..Response::ok()
                        }
                    }
                    Err(e) => self.storage_failure("could not reset counter", e).await,
                }
            }
            Request::GetHistory => {
                match self
                    .inner
                    .store
                    .recent_history(self.inner.limits.history_response_limit)
                    .await
                {
                    Ok(history) => Response {
                        history: Some(history),
                        ..Response::ok()
                    },
                    Err(e) => self.storage_failure("could not read history", e).await,
                }
            }
            Request::ClearHistory => match self.inner.store.clear_history().await {
                Ok(()) => {
                    tracing::info!("history cleared");
                    Response::ok()
                }
                Err(e) => self.storage_failure("could not clear history", e).await,
            },
            Request::GetStats => match self.stats().await {
                Ok(stats) => Response {
                    stats: Some(stats),
                    ..Response::ok()
                },
                Err(e) => self.storage_failure("could not compute stats", e).await,
            },
        }
    }

    /// Validates, names and dispatches (or enqueues) one download.
    pub async fn download(&self, url: &str, tab_id: Option<&str>) -> Result<Response, DownloadError> {
        let inner = &self.inner;
        if !inner.state.refresh().await {
            return Err(DownloadError::Disabled);
        }
        let url = inner.policy.validate(url)?;

        let tab = tab_id.unwrap_or(FALLBACK_TAB);
        let selected = match inner.store.tab_voice_or_init(tab, &inner.default_voice).await {
            Ok(voice) => voice,
            Err(e) => {
                inner
                    .store
                    .log_error("could not read tab voice", &e, inner.limits.error_log_limit)
                    .await;
                return Err(DownloadError::Storage(e));
            }
        };
        let voice = self.voice_key(&selected);

        let allocation = inner
            .counters
            .next(&voice)
            .await
            .map_err(DownloadError::Storage)?;
        if allocation.fallback {
            tracing::warn!(voice = %voice, number = allocation.number, "using time-derived file number");
        }
        let job = Job {
            url: url.to_string(),
            filename: compose_filename(&voice, allocation.number.max(0) as u64),
            voice,
            number: allocation.number,
        };

        if let Some(queue) = &inner.queue {
            if !queue.try_claim() {
                let filename = job.filename.clone();
                match queue.push(job) {
                    Ok(depth) => {
                        tracing::info!(depth, "queued {}", filename);
                        inner.notifier.notify(Notice::Queued(depth));
                        return Ok(Response {
                            queued: Some(true),
                            filename: Some(filename),
                            ..Response::ok()
                        });
                    }
                    Err(job) => {
                        tracing::warn!("queue closed, downloading {} directly", job.filename);
                        return self.dispatch_now(job).await;
                    }
                }
            }
        }
        self.dispatch_now(job).await
    }

    async fn dispatch_now(&self, job: Job) -> Result<Response, DownloadError> {
        let handle = self.inner.dispatcher.run(&job).await?;
        Ok(Response {
            download_id: Some(handle.id),
            filename: Some(job.filename),
            ..Response::ok()
        })
    }

    pub async fn stats(&self) -> Result<Stats> {
        let store = &self.inner.store;
        Ok(Stats {
            total_downloads: store.history_count().await?,
            today_downloads: store.history_count_since(unix_millis() - DAY_MILLIS).await?,
            total_voices: store.counter_count().await?,
            storage_used: store.bytes_in_use().await?,
            queue_depth: self.queue_depth(),
        })
    }

    /// Waits for queued downloads to finish. Later downloads bypass the queue.
    pub async fn shutdown(&self) {
        if let Some(queue) = &self.inner.queue {
            queue.shutdown().await;
        }
    }

    fn voice_key(&self, name: &str) -> String {
        sanitize_voice_name(name, self.inner.limits.max_voice_name_len)
    }

    async fn storage_failure(&self, what: &str, err: anyhow::Error) -> Response {
        self.inner
            .store
            .log_error(what, &err, self.inner.limits.error_log_limit)
            .await;
        Response::rejected(Reason::StorageError)
    }
}
