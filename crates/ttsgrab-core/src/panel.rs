//! Settings & history panel: voice selection, custom names, counters,
//! enabled toggle and the download history, as used by the CLI.
//!
//! Reads and writes the store directly for per-tab settings and goes through
//! the `Transport` for everything the orchestrator owns.

use anyhow::{bail, Result};
use serde::Serialize;

use crate::names::{self, DEFAULT_VOICE};
use crate::orchestrator::{Reason, Request, Response};
use crate::store::{HistoryEntry, Store};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Success,
    Error,
    Info,
}

/// One-line feedback for a panel action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: format!("✓ {}", text.into()),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: format!("❌ {}", text.into()),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: format!("ℹ️ {}", text.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Everything shown when the panel opens for a tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub tab_id: String,
    pub enabled: bool,
    pub voices: Vec<String>,
    pub selected: String,
    pub next_number: i64,
}

pub struct Panel<T> {
    store: Store,
    transport: T,
    enabled_by_default: bool,
    history_limit: usize,
}

impl<T: Transport> Panel<T> {
    pub fn new(store: Store, transport: T, enabled_by_default: bool, history_limit: usize) -> Self {
        Self {
            store,
            transport,
            enabled_by_default,
            history_limit,
        }
    }

    pub async fn open(&self, tab: &str) -> Result<PanelView> {
        let custom = self.store.custom_names().await?;
        let voices = names::all_voices(&custom);
        let selected = match self.store.tab_voice(tab).await? {
            Some(v) if voices.contains(&v) => v,
            _ => DEFAULT_VOICE.to_string(),
        };
        let enabled = self.store.enabled().await?.unwrap_or(self.enabled_by_default);
        let next_number = self.counter(&selected).await?;
        Ok(PanelView {
            tab_id: tab.to_string(),
            enabled,
            voices,
            selected,
            next_number,
        })
    }

    pub async fn toggle(&self, enabled: bool) -> Status {
        if let Err(e) = self.store.set_enabled(enabled).await {
            return Status::error(format!("could not save state: {e:#}"));
        }
        match self.send(Request::UpdateExtensionState { enabled }).await {
            Ok(_) => Status::success(if enabled {
                "Extension enabled"
            } else {
                "Extension disabled"
            }),
            Err(status) => status,
        }
    }

    pub async fn select_voice(&self, tab: &str, name: &str) -> Status {
        let custom = match self.store.custom_names().await {
            Ok(c) => c,
            Err(e) => return Status::error(format!("{e:#}")),
        };
        if !names::is_builtin(name) && !custom.iter().any(|c| c == name) {
            return Status::error(names::NameError::NotFound(name.to_string()).to_string());
        }
        match self.store.set_tab_voice(tab, name).await {
            Ok(()) => Status::success(format!("Voice set: {name}")),
            Err(e) => Status::error(format!("{e:#}")),
        }
    }

    /// Validates and stores `name`, then selects it for `tab`.
    pub async fn add_custom_name(&self, tab: &str, name: &str) -> Status {
        let custom = match self.store.custom_names().await {
            Ok(c) => c,
            Err(e) => return Status::error(format!("{e:#}")),
        };
        let name = match names::validate_custom_name(name, &custom) {
            Ok(n) => n,
            Err(e) => return Status::error(e.to_string()),
        };
        if let Err(e) = self.store.add_custom_name(&name).await {
            return Status::error(format!("{e:#}"));
        }
        if let Err(e) = self.store.set_tab_voice(tab, &name).await {
            return Status::error(format!("{e:#}"));
        }
        Status::success(format!("Name \"{name}\" added"))
    }

    pub async fn remove_custom_name(&self, tab: &str, name: &str) -> Status {
        let custom = match self.store.custom_names().await {
            Ok(c) => c,
            Err(e) => return Status::error(format!("{e:#}")),
        };
        if let Err(e) = names::check_removable(name, &custom) {
            return Status::error(e.to_string());
        }
        if let Err(e) = self.store.remove_custom_name(name).await {
            return Status::error(format!("{e:#}"));
        }
        let was_selected = matches!(self.store.tab_voice(tab).await, Ok(Some(v)) if v == name);
        if was_selected {
            if let Err(e) = self.store.set_tab_voice(tab, DEFAULT_VOICE).await {
                return Status::error(format!("{e:#}"));
            }
            return Status::success(format!("Name \"{name}\" removed, selected \"{DEFAULT_VOICE}\""));
        }
        Status::success(format!("Name \"{name}\" removed"))
    }

    /// Next number `voice` will use.
    pub async fn counter(&self, voice: &str) -> Result<i64> {
        let response = self
            .transport
            .send(Request::GetCounter {
                voice_name: voice.to_string(),
            })
            .await?;
        match response.counter {
            Some(n) if response.success => Ok(n),
            _ => bail!(
                "counter unavailable: {}",
                response.reason.map_or("unknown", Reason::as_str)
            ),
        }
    }

    pub async fn set_counter(&self, voice: &str, next: i64) -> Status {
        if next < 1 {
            return Status::error("Enter a valid number (at least 1)");
        }
        let request = Request::SetCounter {
            voice_name: voice.to_string(),
            number: next,
        };
        match self.send(request).await {
            Ok(_) => Status::success(format!("Counter set to {next}")),
            Err(status) => status,
        }
    }

    pub async fn reset_counter(&self, voice: &str, confirmed: bool) -> Status {
        if !confirmed {
            return Status::info(format!("Reset of \"{voice}\" not confirmed"));
        }
        let request = Request::ResetCounter {
            voice_name: voice.to_string(),
        };
        match self.send(request).await {
            Ok(r) if r.reset == Some(true) => Status::success(format!("Counter for \"{voice}\" reset")),
            Ok(_) => Status::info(format!("Counter for \"{voice}\" is already empty")),
            Err(status) => status,
        }
    }

    /// Recent downloads, newest first.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        let mut entries = self.store.recent_history(self.history_limit).await?;
        entries.reverse();
        Ok(entries)
    }

    pub async fn clear_history(&self, confirmed: bool) -> Status {
        if !confirmed {
            return Status::info("Clearing history not confirmed");
        }
        match self.send(Request::ClearHistory).await {
            Ok(_) => Status::success("History cleared"),
            Err(_) => Status::error("Could not clear history"),
        }
    }

    /// Sends `request`; any failure comes back as an error status.
    async fn send(&self, request: Request) -> Result<Response, Status> {
        match self.transport.send(request).await {
            Ok(r) if r.success => Ok(r),
            Ok(r) => Err(Status::error(reason_text(r.reason))),
            Err(e) => Err(Status::error(format!("orchestrator unreachable: {e:#}"))),
        }
    }
}

fn reason_text(reason: Option<Reason>) -> String {
    match reason {
        Some(Reason::InvalidNumber) => "Enter a valid number (at least 1)".to_string(),
        Some(Reason::StorageError) => "Storage error, see `ttsgrab errors`".to_string(),
        Some(other) => format!("Request failed: {other}"),
        None => "Request failed".to_string(),
    }
}
