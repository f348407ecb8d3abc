//! `ttsgrab history [--clear]`

use anyhow::Result;
use ttsgrab_core::panel::Panel;
use ttsgrab_core::transport::Transport;

use super::{format_millis, report};

pub async fn run_history<T: Transport>(panel: &Panel<T>, clear: bool, yes: bool, json: bool) -> Result<()> {
    if clear {
        if !yes {
            println!("Clearing history cannot be undone; pass --yes to confirm.");
        }
        return report(panel.clear_history(yes).await);
    }

    let entries = panel.history().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("History is empty.");
        return Ok(());
    }
    println!("{:<19}  {:<12}  {}", "TIME", "VOICE", "FILE");
    for e in entries {
        println!(
            "{:<19}  {:<12}  {}",
            format_millis(e.timestamp),
            e.voice_name,
            e.filename
        );
    }
    Ok(())
}
