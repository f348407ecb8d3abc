//! Classification of clicked links.

use anyhow::{Context, Result};
use regex::Regex;

use super::validate::UrlPolicy;
use crate::config::{LinkMode, UrlConfig};

/// Decides whether a resolved link href is a TTS audio download.
#[derive(Debug, Clone)]
pub enum LinkMatcher {
    /// The whole URL must match the regex.
    Pattern(Regex),
    /// Extension and domain rules of the orchestrator.
    Domain(UrlPolicy),
}

impl LinkMatcher {
    pub fn from_config(cfg: &UrlConfig) -> Result<Self> {
        match cfg.link_mode {
            LinkMode::Pattern => {
                let re = Regex::new(&cfg.link_pattern)
                    .with_context(|| format!("invalid link_pattern: {}", cfg.link_pattern))?;
                Ok(LinkMatcher::Pattern(re))
            }
            LinkMode::Domain => Ok(LinkMatcher::Domain(UrlPolicy::from_config(cfg))),
        }
    }

    pub fn matches(&self, href: &str) -> bool {
        let href = href.trim();
        match self {
            LinkMatcher::Pattern(re) => re.is_match(href),
            LinkMatcher::Domain(policy) => policy.is_valid(href),
        }
    }
}

/// Cheap pre-filter used when scanning inserted content: any link whose href ends in `.mp3`.
pub(crate) fn looks_like_audio(href: &str) -> bool {
    href.trim().to_ascii_lowercase().ends_with(".mp3")
}
