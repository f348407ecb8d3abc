use std::time::Duration;
use tokio::time::Instant;

/// Rejects clicks that follow the last intercepted one too closely.
#[derive(Debug)]
pub struct ClickDebounce {
    window: Duration,
    last: Option<Instant>,
}

impl ClickDebounce {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// True if a click at `now` falls inside the window of the last recorded one.
    pub fn is_bouncing(&self, now: Instant) -> bool {
        self.last
            .is_some_and(|last| now.saturating_duration_since(last) < self.window)
    }

    /// Marks `now` as the last intercepted click.
    pub fn record(&mut self, now: Instant) {
        self.last = Some(now);
    }
}
