use anyhow::{anyhow, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::*;
use crate::downloader::{DownloadHandle, DownloadRequest, TransferTimedOut};
use crate::store::open_memory;

const URL: &str = "https://cdn.hailuoai.video/moss/prod/2025-01-31-14/moss-audio/user_audio/a-1.mp3";

/// Records requests instead of fetching anything.
#[derive(Default)]
struct FakeDownloader {
    seen: Mutex<Vec<DownloadRequest>>,
    fail: bool,
    delay: Option<Duration>,
    /// Fail the way a stalled curl transfer does.
    stall: bool,
}

impl FakeDownloader {
    fn paths(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.relative_path.display().to_string())
            .collect()
    }
}

impl Downloader for FakeDownloader {
    fn download(&self, request: &DownloadRequest) -> Result<DownloadHandle> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let mut seen = self.seen.lock().unwrap();
        seen.push(request.clone());
        if self.fail {
            return Err(anyhow!("connection refused"));
        }
        if self.stall {
            return Err(anyhow::Error::new(TransferTimedOut(request.timeout)).context("GET request failed"));
        }
        Ok(DownloadHandle {
            id: seen.len() as u64,
            path: request.relative_path.clone(),
        })
    }
}

fn enabled_config() -> TtsGrabConfig {
    TtsGrabConfig {
        enabled_by_default: true,
        ..TtsGrabConfig::default()
    }
}

async fn orchestrator_with(cfg: TtsGrabConfig, fake: Arc<FakeDownloader>) -> Orchestrator {
    let store = open_memory().await.unwrap();
    Orchestrator::start(&cfg, store, fake).await
}

fn download(url: &str, tab: Option<&str>) -> Request {
    Request::DownloadFile {
        url: url.to_string(),
        tab_id: tab.map(str::to_string),
    }
}

#[tokio::test]
async fn download_names_file_from_tab_voice_and_counter() {
    let fake = Arc::new(FakeDownloader::default());
    let orch = orchestrator_with(enabled_config(), fake.clone()).await;
    orch.store().set_tab_voice("12", "anna").await.unwrap();

    let first = orch.handle(download(URL, Some("12"))).await;
    assert!(first.success);
    assert_eq!(first.download_id, Some(1));
    assert_eq!(first.filename.as_deref(), Some("anna/0001_anna.mp3"));

    let second = orch.handle(download(URL, Some("12"))).await;
    assert_eq!(second.filename.as_deref(), Some("anna/0002_anna.mp3"));

    // Unknown tab gets the default voice, and the choice is remembered.
    let other = orch.handle(download(URL, Some("99"))).await;
    assert_eq!(other.filename.as_deref(), Some("dictor/0001_dictor.mp3"));
    assert_eq!(orch.store().tab_voice("99").await.unwrap().as_deref(), Some("dictor"));

    assert_eq!(
        fake.paths(),
        vec!["anna/0001_anna.mp3", "anna/0002_anna.mp3", "dictor/0001_dictor.mp3"]
    );

    let history = orch.store().recent_history(10).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].voice_name, "anna");
    assert_eq!(history[0].file_number, 1);
}

#[tokio::test]
async fn disabled_extension_rejects_without_side_effects() {
    let fake = Arc::new(FakeDownloader::default());
    let orch = orchestrator_with(TtsGrabConfig::default(), fake.clone()).await;

    let r = orch.handle(download(URL, Some("1"))).await;
    assert_eq!(r, Response::rejected(Reason::Disabled));
    assert!(fake.paths().is_empty());
    assert_eq!(orch.store().last_number("dictor").await.unwrap(), 0);
}

#[tokio::test]
async fn enabled_flag_written_elsewhere_is_honored() {
    let fake = Arc::new(FakeDownloader::default());
    let orch = orchestrator_with(enabled_config(), fake).await;
    orch.store().set_enabled(false).await.unwrap();
    let r = orch.handle(download(URL, None)).await;
    assert_eq!(r.reason, Some(Reason::Disabled));
}

#[tokio::test]
async fn invalid_urls_do_not_consume_numbers() {
    let fake = Arc::new(FakeDownloader::default());
    let orch = orchestrator_with(enabled_config(), fake.clone()).await;

    for bad in [
        "not a url",
        "ftp://cdn.hailuoai.video/a.mp3",
        "https://evil.example/a.mp3",
        "https://cdn.hailuoai.video/a.wav",
        "https://notminimax.io/a.mp3",
    ] {
        let r = orch.handle(download(bad, None)).await;
        assert_eq!(r.reason, Some(Reason::InvalidUrl), "{bad}");
    }
    assert!(fake.paths().is_empty());
    assert_eq!(orch.store().last_number("dictor").await.unwrap(), 0);

    let ok = orch.handle(download("https://minimax.io/x/y.MP3", None)).await;
    assert!(ok.success);
}

#[tokio::test]
async fn failed_download_is_reported_and_logged() {
    let fake = Arc::new(FakeDownloader {
        fail: true,
        ..FakeDownloader::default()
    });
    let orch = orchestrator_with(enabled_config(), fake).await;

    let r = orch.handle(download(URL, None)).await;
    assert_eq!(r.reason, Some(Reason::DownloadFailed));
    assert!(orch.store().recent_history(10).await.unwrap().is_empty());
    let errors = orch.store().recent_errors(1).await.unwrap();
    assert_eq!(errors[0].message, "download failed");
    // The number was used even though the fetch failed.
    assert_eq!(orch.store().last_number("dictor").await.unwrap(), 1);
}

#[tokio::test]
async fn slow_download_times_out() {
    let fake = Arc::new(FakeDownloader {
        delay: Some(Duration::from_millis(1500)),
        ..FakeDownloader::default()
    });
    let mut cfg = enabled_config();
    cfg.timing.download_timeout_secs = 1;
    let orch = orchestrator_with(cfg, fake).await;

    let r = orch.handle(download(URL, None)).await;
    assert_eq!(r.reason, Some(Reason::DownloadTimeout));
}

#[tokio::test]
async fn backend_timeout_is_reported_as_timeout() {
    let fake = Arc::new(FakeDownloader {
        stall: true,
        ..FakeDownloader::default()
    });
    let orch = orchestrator_with(enabled_config(), fake).await;

    let r = orch.handle(download(URL, None)).await;
    assert_eq!(r.reason, Some(Reason::DownloadTimeout));
    let errors = orch.store().recent_errors(1).await.unwrap();
    assert_eq!(errors[0].message, "download failed");
}

#[tokio::test]
async fn set_counter_rejects_numbers_past_the_cap() {
    let fake = Arc::new(FakeDownloader::default());
    let orch = orchestrator_with(enabled_config(), fake.clone()).await;
    let set = |number: i64| Request::SetCounter {
        voice_name: "dictor".into(),
        number,
    };

    for number in [i64::MAX, MAX_FILE_NUMBER + 1] {
        let r = orch.handle(set(number)).await;
        assert_eq!(r.reason, Some(Reason::InvalidNumber), "{number}");
    }
    assert_eq!(orch.store().last_number("dictor").await.unwrap(), 0);

    assert!(orch.handle(set(MAX_FILE_NUMBER)).await.success);
    let a = orch.handle(download(URL, None)).await;
    let b = orch.handle(download(URL, None)).await;
    assert_eq!(
        a.filename,
        Some(format!("dictor/{}_dictor.mp3", MAX_FILE_NUMBER))
    );
    assert_eq!(
        b.filename,
        Some(format!("dictor/{}_dictor.mp3", MAX_FILE_NUMBER + 1))
    );
    let next = orch
        .handle(Request::GetCounter {
            voice_name: "dictor".into(),
        })
        .await;
    assert_eq!(next.counter, Some(MAX_FILE_NUMBER + 2));
}

#[tokio::test]
async fn counter_requests() {
    let orch = orchestrator_with(enabled_config(), Arc::default()).await;
    let get = |v: &str| Request::GetCounter {
        voice_name: v.to_string(),
    };

    assert_eq!(orch.handle(get("anna")).await.counter, Some(1));

    let set = orch
        .handle(Request::SetCounter {
            voice_name: "anna".into(),
            number: 17,
        })
        .await;
    assert!(set.success);
    assert_eq!(orch.handle(get("anna")).await.counter, Some(17));

    let bad = orch
        .handle(Request::SetCounter {
            voice_name: "anna".into(),
            number: 0,
        })
        .await;
    assert_eq!(bad.reason, Some(Reason::InvalidNumber));

    let reset = orch
        .handle(Request::ResetCounter {
            voice_name: "anna".into(),
        })
        .await;
    assert_eq!(reset.reset, Some(true));
    let again = orch
        .handle(Request::ResetCounter {
            voice_name: "anna".into(),
        })
        .await;
    assert_eq!(again.reset, Some(false));
    assert_eq!(orch.handle(get("anna")).await.counter, Some(1));
}

#[tokio::test]
async fn enabled_state_requests() {
    let orch = orchestrator_with(TtsGrabConfig::default(), Arc::default()).await;
    let r = orch.handle(Request::UpdateExtensionState { enabled: true }).await;
    assert_eq!(r.enabled, Some(true));
    assert_eq!(orch.store().enabled().await.unwrap(), Some(true));

    let r = orch.handle(Request::ToggleExtension).await;
    assert_eq!(r.enabled, Some(false));
    assert!(!orch.enabled_state().get());
}

#[tokio::test]
async fn toggle_requires_context_menu_feature() {
    let mut cfg = enabled_config();
    cfg.features.context_menu = false;
    let orch = orchestrator_with(cfg, Arc::default()).await;
    let r = orch.handle(Request::ToggleExtension).await;
    assert_eq!(r.reason, Some(Reason::Unsupported));
    assert!(orch.enabled_state().get());
}

#[tokio::test]
async fn history_and_stats() {
    let mut cfg = enabled_config();
    cfg.limits.history_response_limit = 2;
    let orch = orchestrator_with(cfg, Arc::default()).await;
    for _ in 0..3 {
        assert!(orch.handle(download(URL, None)).await.success);
    }
    orch.handle(Request::GetCounter {
        voice_name: "anna".into(),
    })
    .await;

    let history = orch.handle(Request::GetHistory).await.history.unwrap();
    let numbers: Vec<i64> = history.iter().map(|e| e.file_number).collect();
    assert_eq!(numbers, vec![2, 3]);

    let stats = orch.handle(Request::GetStats).await.stats.unwrap();
    assert_eq!(stats.total_downloads, 3);
    assert_eq!(stats.today_downloads, 3);
    assert_eq!(stats.total_voices, 1);
    assert!(stats.storage_used > 0);
    assert_eq!(stats.queue_depth, 0);

    assert!(orch.handle(Request::ClearHistory).await.success);
    assert!(orch.handle(Request::GetHistory).await.history.unwrap().is_empty());
}

#[tokio::test]
async fn queue_spaces_out_bursts_in_order() {
    let fake = Arc::new(FakeDownloader::default());
    let mut cfg = enabled_config();
    cfg.features.queueing = true;
    cfg.timing.rate_limit_ms = 200;
    let orch = orchestrator_with(cfg, fake.clone()).await;

    let first = orch.handle(download(URL, None)).await;
    assert_eq!(first.download_id, Some(1));
    assert_eq!(first.queued, None);

    let second = orch.handle(download(URL, None)).await;
    let third = orch.handle(download(URL, None)).await;
    assert_eq!(second.queued, Some(true));
    assert_eq!(second.filename.as_deref(), Some("dictor/0002_dictor.mp3"));
    assert_eq!(third.queued, Some(true));
    assert!(orch.queue_depth() >= 1);

    orch.shutdown().await;
    assert_eq!(orch.queue_depth(), 0);
    assert_eq!(
        fake.paths(),
        vec![
            "dictor/0001_dictor.mp3",
            "dictor/0002_dictor.mp3",
            "dictor/0003_dictor.mp3"
        ]
    );
    assert_eq!(orch.store().history_count().await.unwrap(), 3);

    // After shutdown requests go straight through.
    let late = orch.handle(download(URL, None)).await;
    assert_eq!(late.download_id, Some(4));
}

#[tokio::test]
async fn queued_requests_are_still_validated() {
    let fake = Arc::new(FakeDownloader::default());
    let mut cfg = enabled_config();
    cfg.features.queueing = true;
    cfg.timing.rate_limit_ms = 10_000;
    let orch = orchestrator_with(cfg, fake).await;

    assert!(orch.handle(download(URL, None)).await.success);
    let bad = orch.handle(download("https://evil.example/a.mp3", None)).await;
    assert_eq!(bad.reason, Some(Reason::InvalidUrl));
    assert_eq!(orch.queue_depth(), 0);
}
