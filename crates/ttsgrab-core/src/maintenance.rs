//! Periodic history cleanup: age-based pruning plus a size guard.

use anyhow::Result;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::LimitsConfig;
use crate::store::{unix_millis, Store};

pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);
/// History kept when the database nears its size cap.
pub const KEEP_WHEN_FULL: usize = 50;

/// What one cleanup pass removed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub expired: u64,
    pub trimmed: u64,
}

/// Drops history older than `history_max_age_days`; if the database still
/// uses more than 90% of `max_storage_bytes`, keeps only the newest entries.
pub async fn cleanup_old_history(store: &Store, limits: &LimitsConfig) -> Result<CleanupReport> {
    let max_age_ms =
        i64::try_from(limits.history_max_age_days.saturating_mul(24 * 60 * 60 * 1000)).unwrap_or(i64::MAX);
    let expired = store
        .prune_history_before(unix_millis().saturating_sub(max_age_ms))
        .await?;

    let used = store.bytes_in_use().await?;
    let trimmed = if used.saturating_mul(10) > limits.max_storage_bytes.saturating_mul(9) {
        tracing::warn!(used, cap = limits.max_storage_bytes, "state database nearly full");
        store.retain_newest_history(KEEP_WHEN_FULL).await?
    } else {
        0
    };

    if expired > 0 || trimmed > 0 {
        tracing::info!(expired, trimmed, "history cleanup");
    }
    Ok(CleanupReport { expired, trimmed })
}

/// Runs a cleanup now and then every `interval` until aborted.
pub fn spawn_cleanup(store: Store, limits: LimitsConfig, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(e) = cleanup_old_history(&store, &limits).await {
                store
                    .log_error("history cleanup failed", &e, limits.error_log_limit)
                    .await;
            }
        }
    })
}
