//! Failures of a download request, mapped to wire reason codes.

use std::time::Duration;

use super::message::Reason;
use crate::url_model::UrlRejection;

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("extension is disabled")]
    Disabled,
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] UrlRejection),
    #[error("download timed out after {0:?}")]
    Timeout(Duration),
    #[error("download failed: {0:#}")]
    Failed(anyhow::Error),
    #[error("storage: {0:#}")]
    Storage(anyhow::Error),
}

impl DownloadError {
    pub fn reason(&self) -> Reason {
        match self {
            DownloadError::Disabled => Reason::Disabled,
            DownloadError::InvalidUrl(_) => Reason::InvalidUrl,
            DownloadError::Timeout(_) => Reason::DownloadTimeout,
            DownloadError::Failed(_) => Reason::DownloadFailed,
            DownloadError::Storage(_) => Reason::StorageError,
        }
    }

    /// Whether this belongs in the persisted error log (user-caused rejections do not).
    pub fn is_critical(&self) -> bool {
        !matches!(self, DownloadError::Disabled | DownloadError::InvalidUrl(_))
    }
}
