//! `ttsgrab click <href>` – run one link click through the interceptor.
//!
//! `--inserted` hrefs are fed through link discovery first, as if the page
//! had added those links before the click.

use anyhow::Result;
use ttsgrab_core::config::TtsGrabConfig;
use ttsgrab_core::interceptor::{ClickEvent, ClickOutcome, Interceptor, LinkDiscovery, LinkMatcher};
use ttsgrab_core::state::EnabledState;
use ttsgrab_core::store::Store;
use ttsgrab_core::transport::Transport;

pub async fn run_click(
    cfg: &TtsGrabConfig,
    store: &Store,
    client: &impl Transport,
    href: &str,
    inserted: Vec<String>,
    tab: &str,
) -> Result<()> {
    if !inserted.is_empty() {
        let (discovery, worker) = LinkDiscovery::spawn(cfg.timing.discovery_debounce());
        discovery.observe(inserted);
        let found = discovery.close(worker).await;
        println!("Page has {} new audio link(s).", found);
    }

    let matcher = LinkMatcher::from_config(&cfg.urls)?;
    let state = EnabledState::load(store.clone(), cfg.enabled_by_default).await;
    let interceptor = Interceptor::new(
        client,
        matcher,
        state.subscribe(),
        cfg.timing.click_debounce(),
    );

    let outcome = interceptor
        .on_click(ClickEvent {
            href: Some(href.to_string()),
            tab_id: Some(tab.to_string()),
        })
        .await;
    tracing::debug!(?outcome, "click outcome");

    match outcome {
        ClickOutcome::Ignored => println!("Not a TTS audio link; browser navigates normally."),
        ClickOutcome::Debounced => println!("Click ignored (too soon after the last one)."),
        ClickOutcome::PassThrough => println!("Interception is off; browser downloads natively."),
        ClickOutcome::Downloaded { download_id } => println!("Downloaded (id {})", download_id),
        ClickOutcome::Queued => println!("Queued"),
        ClickOutcome::Fallback(reason) => {
            println!("Rejected ({}); falling back to the native download.", reason)
        }
        ClickOutcome::Failed(reason) => anyhow::bail!(
            "download failed: {}",
            reason.map_or("orchestrator unreachable", |r| r.as_str())
        ),
    }
    Ok(())
}
