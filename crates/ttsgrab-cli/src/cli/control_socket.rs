//! Control socket: server (during `ttsgrab serve`) and client (every other command).
//! Protocol: one JSON `Request` per line in, one JSON `Response` per line out.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use ttsgrab_core::config;
use ttsgrab_core::orchestrator::{Orchestrator, Reason, Request, Response};

/// `~/.local/state/ttsgrab/control.sock`
pub fn default_socket_path() -> Result<PathBuf> {
    Ok(config::state_dir()?.join("control.sock"))
}

/// Answers one wire line. Lines that do not parse get `unknown-action`.
pub async fn answer_line(orchestrator: &Orchestrator, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => orchestrator.handle(request).await,
        Err(e) => {
            tracing::debug!("unparseable request {:?}: {}", line, e);
            Response::rejected(Reason::UnknownAction)
        }
    }
}

/// Binds `path` (replacing a stale socket) and serves requests until aborted.
pub fn spawn_control_listener(
    orchestrator: Orchestrator,
    path: impl AsRef<Path>,
) -> Result<tokio::task::JoinHandle<()>> {
    let path = path.as_ref().to_path_buf();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir: {}", parent.display()))?;
    }
    let _ = std::fs::remove_file(&path);
    let listener = UnixListener::bind(&path)
        .with_context(|| format!("control socket bind: {}", path.display()))?;
    let handle = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let orchestrator = orchestrator.clone();
                    tokio::spawn(async move {
                        let (read, mut write) = stream.into_split();
                        let mut lines = BufReader::new(read).lines();
                        while let Ok(Some(line)) = lines.next_line().await {
                            let line = line.trim();
                            if line.is_empty() {
                                continue;
                            }
                            let response = answer_line(&orchestrator, line).await;
                            let mut out = match serde_json::to_string(&response) {
                                Ok(s) => s,
                                Err(e) => {
                                    tracing::warn!("could not encode response: {}", e);
                                    break;
                                }
                            };
                            out.push('\n');
                            if let Err(e) = write.write_all(out.as_bytes()).await {
                                tracing::debug!("control socket write: {}", e);
                                break;
                            }
                        }
                    });
                }
                Err(e) => tracing::debug!("control socket accept: {}", e),
            }
        }
    });
    Ok(handle)
}

/// Sends one request over the socket at `socket_path` and waits for the reply.
pub async fn send_request(socket_path: &Path, request: &Request) -> Result<Response> {
    let stream = UnixStream::connect(socket_path)
        .await
        .with_context(|| format!("connect {}", socket_path.display()))?;
    let (read, mut write) = stream.into_split();
    let mut msg = serde_json::to_string(request)?;
    msg.push('\n');
    write.write_all(msg.as_bytes()).await?;

    let mut lines = BufReader::new(read).lines();
    let line = lines
        .next_line()
        .await?
        .context("control socket closed without a response")?;
    let response = serde_json::from_str(&line).context("malformed response")?;
    Ok(response)
}
