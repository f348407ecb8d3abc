//! Desktop notifications via notify-rust (D-Bus).

use notify_rust::Notification;

const SUMMARY: &str = "TTS Click Interceptor";

/// What happened, in notification terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Downloaded(String),
    Failed(String),
    Queued(usize),
}

impl Notice {
    pub fn body(&self) -> String {
        match self {
            Notice::Downloaded(filename) => format!("✓ Downloaded: {filename}"),
            Notice::Failed(filename) => format!("✗ Download failed: {filename}"),
            Notice::Queued(depth) => format!("⏳ In queue: {depth} file(s)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notifier {
    enabled: bool,
}

impl Notifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Shows `notice` without blocking the caller. Must run inside a Tokio runtime.
    pub fn notify(&self, notice: Notice) {
        if !self.enabled {
            return;
        }
        let body = notice.body();
        tracing::debug!("notification: {}", body);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = Notification::new()
                .summary(SUMMARY)
                .body(&body)
                .icon("audio-x-generic")
                .timeout(3000)
                .show()
            {
                tracing::warn!("failed to show notification: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bodies() {
        assert_eq!(
            Notice::Downloaded("dictor/0001_dictor.mp3".into()).body(),
            "✓ Downloaded: dictor/0001_dictor.mp3"
        );
        assert_eq!(Notice::Failed("x.mp3".into()).body(), "✗ Download failed: x.mp3");
        assert_eq!(Notice::Queued(3).body(), "⏳ In queue: 3 file(s)");
    }

    #[test]
    fn disabled_notifier_is_silent() {
        // No runtime here: a disabled notifier must return before spawning.
        Notifier::new(false).notify(Notice::Queued(1));
    }
}
