use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Optional behaviors that used to live in separate forks of the interceptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Rate-limit downloads through a FIFO queue.
    pub queueing: bool,
    /// Desktop notifications for finished, failed and queued downloads.
    pub notifications: bool,
    /// Context-menu style toggle (`toggleExtension`) and its title watcher.
    pub context_menu: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            queueing: false,
            notifications: false,
            context_menu: true,
        }
    }
}

/// How the interceptor decides that a clicked link is a TTS download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    /// Full URL must match `link_pattern`.
    #[default]
    Pattern,
    /// Extension plus domain allow-list (same rules as the orchestrator).
    Domain,
}

/// Which URLs are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlConfig {
    /// Hostnames accepted exactly or as a parent domain.
    pub allowed_domains: Vec<String>,
    /// Required path extension, including the dot.
    pub extension: String,
    pub link_mode: LinkMode,
    /// Regex used by the interceptor in `pattern` mode.
    pub link_pattern: String,
}

pub const DEFAULT_LINK_PATTERN: &str = r"^https://cdn\.hailuoai\.video/moss/prod/\d{4}-\d{2}-\d{2}-\d{2}/moss-audio/user_audio/[\w-]+-\d+\.mp3$";

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            allowed_domains: [
                "cdn.hailuoai.video",
                "hailuoai.video",
                "hailuoai.com",
                "minimax.io",
                "cdn.minimax.io",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            extension: ".mp3".to_string(),
            link_mode: LinkMode::Pattern,
            link_pattern: DEFAULT_LINK_PATTERN.to_string(),
        }
    }
}

/// Retention and size bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// History records kept; oldest are evicted past this.
    pub history_retention: usize,
    /// Records returned by `getHistory`.
    pub history_response_limit: usize,
    /// Records shown by the panel.
    pub history_view_limit: usize,
    /// Entries kept in the diagnostic error log.
    pub error_log_limit: usize,
    /// Maximum length (chars) of a sanitized voice name.
    pub max_voice_name_len: usize,
    /// History older than this many days is dropped by maintenance.
    pub history_max_age_days: u64,
    /// Soft cap for the state database; past 90% history is cut to 50 entries.
    pub max_storage_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            history_retention: 100,
            history_response_limit: 20,
            history_view_limit: 30,
            error_log_limit: 50,
            max_voice_name_len: 100,
            history_max_age_days: 30,
            max_storage_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Timeouts and debounce windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub download_timeout_secs: u64,
    /// Minimum spacing between dispatched downloads when queueing is on.
    pub rate_limit_ms: u64,
    pub click_debounce_ms: u64,
    pub discovery_debounce_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            download_timeout_secs: 30,
            rate_limit_ms: 500,
            click_debounce_ms: 300,
            discovery_debounce_ms: 100,
        }
    }
}

impl TimingConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    pub fn click_debounce(&self) -> Duration {
        Duration::from_millis(self.click_debounce_ms)
    }

    pub fn discovery_debounce(&self) -> Duration {
        Duration::from_millis(self.discovery_debounce_ms)
    }
}

/// Retry policy parameters for counter updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.1 = 100ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.1,
            max_delay_secs: 1,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/ttsgrab/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsGrabConfig {
    /// Enabled flag used when the store has never recorded one.
    #[serde(default)]
    pub enabled_by_default: bool,
    /// Root directory for downloads (None = current directory).
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Voice used for tabs that never picked one.
    #[serde(default = "default_voice")]
    pub default_voice: String,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub urls: UrlConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_voice() -> String {
    crate::names::DEFAULT_VOICE.to_string()
}

impl Default for TtsGrabConfig {
    fn default() -> Self {
        Self {
            enabled_by_default: false,
            download_dir: None,
            default_voice: default_voice(),
            features: FeatureConfig::default(),
            urls: UrlConfig::default(),
            limits: LimitsConfig::default(),
            timing: TimingConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl TtsGrabConfig {
    /// Download root: configured directory, or the current directory.
    pub fn resolve_download_dir(&self) -> Result<PathBuf> {
        match &self.download_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("current directory"),
        }
    }
}

/// State directory for the database, log and control socket: `~/.local/state/ttsgrab`.
pub fn state_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ttsgrab")?;
    Ok(xdg_dirs.get_state_home().join("ttsgrab"))
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ttsgrab")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TtsGrabConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<TtsGrabConfig> {
    if !path.exists() {
        let default_cfg = TtsGrabConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: TtsGrabConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
