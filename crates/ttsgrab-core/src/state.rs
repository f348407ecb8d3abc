//! Enabled flag shared by the interceptor, orchestrator and panel.
//!
//! The store is the source of truth; `EnabledState` mirrors it in memory and
//! pushes every change to subscribers through a `watch` channel. Other
//! processes change the store directly, so readers that must be current call
//! `refresh` first.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;

use crate::store::Store;

#[derive(Clone)]
pub struct EnabledState {
    store: Store,
    tx: Arc<watch::Sender<bool>>,
}

impl EnabledState {
    /// Loads the flag from the store; `default` is used when it was never
    /// written or the read fails.
    pub async fn load(store: Store, default: bool) -> Self {
        let initial = match store.enabled().await {
            Ok(Some(v)) => v,
            Ok(None) => default,
            Err(e) => {
                tracing::warn!("could not read enabled flag, using {}: {:#}", default, e);
                default
            }
        };
        let (tx, _rx) = watch::channel(initial);
        tracing::debug!(enabled = initial, "enabled state loaded");
        Self {
            store,
            tx: Arc::new(tx),
        }
    }

    pub fn get(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Persists `enabled` and notifies subscribers if it changed.
    pub async fn set(&self, enabled: bool) -> Result<()> {
        self.store.set_enabled(enabled).await?;
        self.publish(enabled);
        Ok(())
    }

    /// Flips the flag and returns the new value.
    pub async fn toggle(&self) -> Result<bool> {
        let next = !self.refresh().await;
        self.set(next).await?;
        Ok(next)
    }

    /// Re-reads the store and publishes any change made elsewhere.
    /// On a read failure the cached value is kept.
    pub async fn refresh(&self) -> bool {
        match self.store.enabled().await {
            Ok(Some(v)) => {
                self.publish(v);
                v
            }
            Ok(None) => self.get(),
            Err(e) => {
                tracing::warn!("could not refresh enabled flag: {:#}", e);
                self.get()
            }
        }
    }

    fn publish(&self, enabled: bool) {
        let changed = self.tx.send_if_modified(|cur| {
            if *cur == enabled {
                false
            } else {
                *cur = enabled;
                true
            }
        });
        if changed {
            tracing::info!("extension {}", if enabled { "enabled" } else { "disabled" });
        }
    }
}
