//! `ttsgrab counter show|set|reset`

use anyhow::Result;
use ttsgrab_core::panel::Panel;
use ttsgrab_core::transport::Transport;

use super::report;
use crate::cli::CounterAction;

pub async fn run_counter<T: Transport>(panel: &Panel<T>, tab: &str, action: CounterAction) -> Result<()> {
    match action {
        CounterAction::Show { voice } => {
            let voice = resolve_voice(panel, tab, voice).await?;
            let next = panel.counter(&voice).await?;
            println!("{}: next file #{:04}", voice, next);
            Ok(())
        }
        CounterAction::Set { number, voice } => {
            let voice = resolve_voice(panel, tab, voice).await?;
            report(panel.set_counter(&voice, number).await)
        }
        CounterAction::Reset { voice, yes } => {
            let voice = resolve_voice(panel, tab, voice).await?;
            if !yes {
                println!("Resetting \"{}\" cannot be undone; pass --yes to confirm.", voice);
            }
            report(panel.reset_counter(&voice, yes).await)
        }
    }
}

/// Explicit voice, or the one selected for the tab.
async fn resolve_voice<T: Transport>(panel: &Panel<T>, tab: &str, voice: Option<String>) -> Result<String> {
    match voice {
        Some(v) => Ok(v),
        None => Ok(panel.open(tab).await?.selected),
    }
}
