//! Audio URL validation: scheme, extension, and domain allow-list.

use url::Url;

use crate::config::UrlConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlRejection {
    #[error("not a valid URL")]
    Unparseable,
    #[error("scheme {0:?} is not http or https")]
    Scheme(String),
    #[error("path does not end in {0}")]
    Extension(String),
    #[error("host {0:?} is not on the allow-list")]
    Domain(String),
}

/// Accepted URL shape for downloads.
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    allowed_domains: Vec<String>,
    extension: String,
}

impl UrlPolicy {
    pub fn new(allowed_domains: Vec<String>, extension: impl Into<String>) -> Self {
        Self {
            allowed_domains: allowed_domains
                .into_iter()
                .map(|d| d.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
            extension: extension.into().to_ascii_lowercase(),
        }
    }

    pub fn from_config(cfg: &UrlConfig) -> Self {
        Self::new(cfg.allowed_domains.clone(), cfg.extension.clone())
    }

    /// True if `host` equals an allowed domain or is a subdomain of one.
    pub fn host_allowed(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.allowed_domains.iter().any(|d| {
            host == *d
                || host
                    .strip_suffix(d.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    /// Validates `raw` and returns the parsed URL.
    pub fn validate(&self, raw: &str) -> Result<Url, UrlRejection> {
        let url = Url::parse(raw.trim()).map_err(|_| UrlRejection::Unparseable)?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(UrlRejection::Scheme(other.to_string())),
        }
        if !url.path().to_ascii_lowercase().ends_with(&self.extension) {
            return Err(UrlRejection::Extension(self.extension.clone()));
        }
        let host = url.host_str().unwrap_or_default();
        if !self.host_allowed(host) {
            return Err(UrlRejection::Domain(host.to_string()));
        }
        Ok(url)
    }

    pub fn is_valid(&self, raw: &str) -> bool {
        self.validate(raw).is_ok()
    }
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self::from_config(&UrlConfig::default())
    }
}
