//! `ttsgrab stats` and `ttsgrab errors`

use anyhow::Result;
use ttsgrab_core::orchestrator::Request;
use ttsgrab_core::store::Store;
use ttsgrab_core::transport::Transport;

use super::format_millis;

pub async fn run_stats(client: &impl Transport, json: bool) -> Result<()> {
    let response = client.send(Request::GetStats).await?;
    let Some(stats) = response.stats.filter(|_| response.success) else {
        anyhow::bail!(
            "stats unavailable: {}",
            response.reason.map_or("unknown", |r| r.as_str())
        );
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    println!("Total downloads: {}", stats.total_downloads);
    println!("Last 24 hours:   {}", stats.today_downloads);
    println!("Voices:          {}", stats.total_voices);
    println!("Storage used:    {:.1} KiB", stats.storage_used as f64 / 1024.0);
    println!("Queue depth:     {}", stats.queue_depth);
    Ok(())
}

pub async fn run_errors(store: &Store, limit: usize) -> Result<()> {
    let errors = store.recent_errors(limit).await?;
    if errors.is_empty() {
        println!("No recorded errors.");
        return Ok(());
    }
    for e in errors {
        match e.detail {
            Some(detail) => println!("{}  {}: {}", format_millis(e.timestamp), e.message, detail),
            None => println!("{}  {}", format_millis(e.timestamp), e.message),
        }
    }
    Ok(())
}
