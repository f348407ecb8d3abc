//! Orchestrator access for CLI commands: the running daemon if one listens on
//! the control socket, otherwise an in-process orchestrator.

use anyhow::Result;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use ttsgrab_core::config::TtsGrabConfig;
use ttsgrab_core::downloader::CurlDownloader;
use ttsgrab_core::orchestrator::{Orchestrator, Request, Response};
use ttsgrab_core::store::Store;
use ttsgrab_core::transport::Transport;

use super::control_socket;

pub enum Client {
    Socket(PathBuf),
    Local(Orchestrator),
}

impl Client {
    pub async fn connect(cfg: &TtsGrabConfig, store: &Store, socket: PathBuf) -> Result<Self> {
        if socket.exists() && tokio::net::UnixStream::connect(&socket).await.is_ok() {
            tracing::debug!(socket = %socket.display(), "using running daemon");
            return Ok(Client::Socket(socket));
        }
        let root = cfg.resolve_download_dir()?;
        tracing::debug!(root = %root.display(), "no daemon, running in-process");
        let downloader = Arc::new(CurlDownloader::new(root));
        Ok(Client::Local(
            Orchestrator::start(cfg, store.clone(), downloader).await,
        ))
    }

    /// Waits for anything an in-process orchestrator still has queued.
    pub async fn finish(&self) {
        if let Client::Local(orchestrator) = self {
            orchestrator.shutdown().await;
        }
    }
}

impl Transport for Client {
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        async move {
            match self {
                Client::Socket(path) => control_socket::send_request(path, &request).await,
                Client::Local(orchestrator) => Ok(orchestrator.handle(request).await),
            }
        }
    }
}
