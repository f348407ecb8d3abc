//! CLI command handlers. Each command is in its own file.

mod click;
mod counter;
mod docs;
mod download;
mod history;
mod names;
mod serve;
mod state;
mod stats;

pub use click::run_click;
pub use counter::run_counter;
pub use docs::{run_completions, run_man};
pub use download::run_download;
pub use history::run_history;
pub use names::{run_names, run_voice};
pub use serve::run_serve;
pub use state::{run_set_enabled, run_toggle};
pub use stats::{run_errors, run_stats};

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use ttsgrab_core::panel::Status;

/// Prints a panel status; error statuses become the command's error.
fn report(status: Status) -> Result<()> {
    if status.is_error() {
        anyhow::bail!("{}", status);
    }
    println!("{}", status);
    Ok(())
}

/// Unix milliseconds as local `YYYY-MM-DD HH:MM:SS`.
fn format_millis(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}
