//! `ttsgrab voice [name]` and `ttsgrab names list|add|remove`

use anyhow::Result;
use ttsgrab_core::panel::{Panel, PanelView};
use ttsgrab_core::transport::Transport;

use super::report;
use crate::cli::NamesAction;

pub async fn run_voice<T: Transport>(panel: &Panel<T>, tab: &str, name: Option<&str>) -> Result<()> {
    if let Some(name) = name {
        return report(panel.select_voice(tab, name).await);
    }
    let view = panel.open(tab).await?;
    println!("Tab:         {}", view.tab_id);
    println!("Interceptor: {}", if view.enabled { "enabled" } else { "disabled" });
    println!("Voice:       {}", view.selected);
    println!("Next file:   #{:04}", view.next_number);
    Ok(())
}

pub async fn run_names<T: Transport>(panel: &Panel<T>, tab: &str, action: NamesAction) -> Result<()> {
    match action {
        NamesAction::List => {
            let view = panel.open(tab).await?;
            print_voices(&view);
            Ok(())
        }
        NamesAction::Add { name } => report(panel.add_custom_name(tab, &name).await),
        NamesAction::Remove { name } => report(panel.remove_custom_name(tab, &name).await),
    }
}

fn print_voices(view: &PanelView) {
    for voice in &view.voices {
        let marker = if *voice == view.selected { "*" } else { " " };
        println!("{} {}", marker, voice);
    }
}
