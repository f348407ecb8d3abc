//! `ttsgrab serve` – orchestrator daemon: control socket, history cleanup and menu watcher.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use ttsgrab_core::config::TtsGrabConfig;
use ttsgrab_core::downloader::CurlDownloader;
use ttsgrab_core::maintenance::{spawn_cleanup, CLEANUP_INTERVAL};
use ttsgrab_core::menu::ContextMenu;
use ttsgrab_core::orchestrator::Orchestrator;
use ttsgrab_core::store::Store;

use crate::cli::control_socket::spawn_control_listener;

pub async fn run_serve(cfg: &TtsGrabConfig, store: Store, socket: &Path) -> Result<()> {
    let root = cfg.resolve_download_dir()?;
    let downloader = Arc::new(CurlDownloader::new(&root));
    let orchestrator = Orchestrator::start(cfg, store.clone(), downloader).await;

    let cleanup = spawn_cleanup(store, cfg.limits.clone(), CLEANUP_INTERVAL);
    let menu = cfg
        .features
        .context_menu
        .then(|| ContextMenu::spawn(orchestrator.enabled_state().subscribe()));
    if let Some((menu, _)) = &menu {
        tracing::info!("menu title: {}", menu.title());
    }

    let listener = spawn_control_listener(orchestrator.clone(), socket)?;
    tracing::info!(socket = %socket.display(), root = %root.display(), "serving");
    println!(
        "ttsgrab serving on {} (downloads to {}); Ctrl-C to stop",
        socket.display(),
        root.display()
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");

    listener.abort();
    cleanup.abort();
    if let Some((_, watcher)) = menu {
        watcher.abort();
    }
    orchestrator.shutdown().await;
    if let Err(e) = std::fs::remove_file(socket) {
        tracing::debug!("remove control socket: {}", e);
    }
    Ok(())
}
