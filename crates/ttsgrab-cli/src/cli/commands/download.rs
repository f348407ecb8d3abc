//! `ttsgrab download <url>` – send one download request.

use anyhow::Result;
use ttsgrab_core::orchestrator::Request;
use ttsgrab_core::transport::Transport;

pub async fn run_download(client: &impl Transport, url: &str, tab: &str) -> Result<()> {
    let response = client
        .send(Request::DownloadFile {
            url: url.to_string(),
            tab_id: Some(tab.to_string()),
        })
        .await?;
    if !response.success {
        anyhow::bail!(
            "download rejected: {}",
            response.reason.map_or("unknown", |r| r.as_str())
        );
    }
    let filename = response.filename.unwrap_or_default();
    if response.queued == Some(true) {
        println!("Queued {}", filename);
    } else {
        println!(
            "Downloaded {} (id {})",
            filename,
            response.download_id.unwrap_or_default()
        );
    }
    Ok(())
}
