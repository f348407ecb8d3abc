//! Link interceptor: turns clicks on TTS audio links into download requests.
//!
//! The interceptor knows nothing about storage. It reads the enabled flag
//! from a `watch` subscription and talks to the orchestrator through a
//! `Transport`.

mod debounce;
mod discovery;

pub use debounce::ClickDebounce;
pub use discovery::{count_audio_links, LinkDiscovery};
pub use crate::url_model::LinkMatcher;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::orchestrator::{Reason, Request};
use crate::transport::Transport;

/// A click on (or inside) a link.
#[derive(Debug, Clone, Default)]
pub struct ClickEvent {
    /// Resolved href of the closest enclosing link, if any.
    pub href: Option<String>,
    pub tab_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Not a link, or not a TTS audio link.
    Ignored,
    /// Too soon after the previous intercepted click.
    Debounced,
    /// Extension disabled: the browser handles the click itself.
    PassThrough,
    Downloaded { download_id: u64 },
    Queued,
    /// Rejected in a way that calls for a native download instead.
    Fallback(Reason),
    Failed(Option<Reason>),
}

impl ClickOutcome {
    /// Whether the default navigation was suppressed.
    pub fn prevented_default(&self) -> bool {
        matches!(
            self,
            ClickOutcome::Downloaded { .. }
                | ClickOutcome::Queued
                | ClickOutcome::Fallback(_)
                | ClickOutcome::Failed(_)
        )
    }
}

pub struct Interceptor<T> {
    transport: T,
    matcher: LinkMatcher,
    enabled: watch::Receiver<bool>,
    debounce: Mutex<ClickDebounce>,
    dimmed: Arc<Mutex<HashSet<String>>>,
}

impl<T: Transport> Interceptor<T> {
    pub fn new(
        transport: T,
        matcher: LinkMatcher,
        enabled: watch::Receiver<bool>,
        debounce_window: Duration,
    ) -> Self {
        Self {
            transport,
            matcher,
            enabled,
            debounce: Mutex::new(ClickDebounce::new(debounce_window)),
            dimmed: Arc::default(),
        }
    }

    /// True while a request for `href` is in flight.
    pub fn is_dimmed(&self, href: &str) -> bool {
        lock(&self.dimmed).contains(href)
    }

    pub async fn on_click(&self, event: ClickEvent) -> ClickOutcome {
        let now = Instant::now();
        if lock(&self.debounce).is_bouncing(now) {
            tracing::debug!("click ignored (debounce)");
            return ClickOutcome::Debounced;
        }

        let Some(href) = event.href.as_deref().map(str::trim).filter(|h| !h.is_empty()) else {
            return ClickOutcome::Ignored;
        };
        if !self.matcher.matches(href) {
            return ClickOutcome::Ignored;
        }
        tracing::debug!("intercepted click on {}", href);

        if !*self.enabled.borrow() {
            tracing::debug!("extension disabled, not intercepting");
            return ClickOutcome::PassThrough;
        }
        lock(&self.debounce).record(now);

        let _dim = DimGuard::new(Arc::clone(&self.dimmed), href);
        let request = Request::DownloadFile {
            url: href.to_string(),
            tab_id: event.tab_id.clone(),
        };
        match self.transport.send(request).await {
            Ok(response) if response.success => {
                if response.queued == Some(true) {
                    ClickOutcome::Queued
                } else {
                    match response.download_id {
                        Some(download_id) => ClickOutcome::Downloaded { download_id },
                        None => ClickOutcome::Failed(None),
                    }
                }
            }
            Ok(response) => {
                tracing::warn!(
                    "download request failed: {}",
                    response.reason.map_or("unknown", Reason::as_str)
                );
                match response.reason {
                    Some(reason) if reason.allows_native_fallback() => ClickOutcome::Fallback(reason),
                    reason => ClickOutcome::Failed(reason),
                }
            }
            Err(e) => {
                tracing::error!("could not reach orchestrator: {:#}", e);
                ClickOutcome::Failed(None)
            }
        }
    }
}

fn lock<V>(m: &Mutex<V>) -> std::sync::MutexGuard<'_, V> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Dims a link for the lifetime of the guard.
struct DimGuard {
    set: Arc<Mutex<HashSet<String>>>,
    href: String,
}

impl DimGuard {
    fn new(set: Arc<Mutex<HashSet<String>>>, href: &str) -> Self {
        lock(&set).insert(href.to_string());
        Self {
            set,
            href: href.to_string(),
        }
    }
}

impl Drop for DimGuard {
    fn drop(&mut self) {
        lock(&self.set).remove(&self.href);
    }
}
