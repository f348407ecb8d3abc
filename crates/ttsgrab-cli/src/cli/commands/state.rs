//! `ttsgrab enable|disable|toggle`

use anyhow::Result;
use ttsgrab_core::menu::menu_title;
use ttsgrab_core::orchestrator::{Reason, Request};
use ttsgrab_core::panel::Panel;
use ttsgrab_core::transport::Transport;

use super::report;

pub async fn run_set_enabled<T: Transport>(panel: &Panel<T>, enabled: bool) -> Result<()> {
    report(panel.toggle(enabled).await)
}

pub async fn run_toggle(client: &impl Transport) -> Result<()> {
    let response = client.send(Request::ToggleExtension).await?;
    match response.enabled {
        Some(enabled) if response.success => {
            println!("{}", menu_title(enabled));
            Ok(())
        }
        _ => match response.reason {
            Some(Reason::Unsupported) => {
                anyhow::bail!("toggle is disabled in config (features.context_menu = false)")
            }
            reason => anyhow::bail!(
                "toggle failed: {}",
                reason.map_or("unknown", |r| r.as_str())
            ),
        },
    }
}
