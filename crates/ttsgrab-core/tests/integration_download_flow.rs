//! Integration test: local HTTP server, real curl downloads, on-disk SQLite.
//!
//! Drives the orchestrator (and the interceptor on top of it) the way the CLI
//! does and checks the files that land in the download directory.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tempfile::tempdir;
use ttsgrab_core::config::{LinkMode, TtsGrabConfig};
use ttsgrab_core::downloader::{CurlDownloader, DownloadRequest, Downloader, TransferTimedOut};
use ttsgrab_core::interceptor::{ClickEvent, ClickOutcome, Interceptor, LinkMatcher};
use ttsgrab_core::orchestrator::{Orchestrator, Reason, Request};
use ttsgrab_core::store::Store;

fn local_config() -> TtsGrabConfig {
    let mut cfg = TtsGrabConfig::default();
    cfg.enabled_by_default = true;
    cfg.urls.allowed_domains = vec!["127.0.0.1".to_string()];
    cfg
}

struct Harness {
    orch: Orchestrator,
    downloads: tempfile::TempDir,
    _state: tempfile::TempDir,
}

async fn harness(cfg: TtsGrabConfig) -> Harness {
    let downloads = tempdir().unwrap();
    let state = tempdir().unwrap();
    let store = Store::open_at(state.path().join("state.db")).await.unwrap();
    let downloader = Arc::new(CurlDownloader::new(downloads.path()));
    let orch = Orchestrator::start(&cfg, store, downloader).await;
    Harness {
        orch,
        downloads,
        _state: state,
    }
}

fn download(url: String, tab: &str) -> Request {
    Request::DownloadFile {
        url,
        tab_id: Some(tab.to_string()),
    }
}

#[tokio::test]
async fn downloads_land_under_voice_directory_with_sequence_numbers() {
    let body: Vec<u8> = (0u8..200).cycle().take(32 * 1024).collect();
    let server = common::audio_server::start(body.clone());
    let h = harness(local_config()).await;
    h.orch.store().set_tab_voice("3", "anna").await.unwrap();

    for expected in ["anna/0001_anna.mp3", "anna/0002_anna.mp3"] {
        let r = h.orch.handle(download(server.url("moss/a-1.mp3"), "3")).await;
        assert!(r.success, "{r:?}");
        assert_eq!(r.filename.as_deref(), Some(expected));
        let content = std::fs::read(h.downloads.path().join(expected)).unwrap();
        assert_eq!(content, body);
    }
    assert_eq!(server.hits(), 2);

    let history = h.orch.store().recent_history(10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].file_number, 2);
}

#[tokio::test]
async fn reused_number_is_renamed_instead_of_overwritten() {
    let server = common::audio_server::start(b"ID3 first".to_vec());
    let h = harness(local_config()).await;

    assert!(h.orch.handle(download(server.url("a.mp3"), "1")).await.success);
    let set = h
        .orch
        .handle(Request::SetCounter {
            voice_name: "dictor".into(),
            number: 1,
        })
        .await;
    assert!(set.success);
    let again = h.orch.handle(download(server.url("a.mp3"), "1")).await;
    assert_eq!(again.filename.as_deref(), Some("dictor/0001_dictor.mp3"));

    let dir = h.downloads.path().join("dictor");
    assert!(dir.join("0001_dictor.mp3").exists());
    assert!(dir.join("0001_dictor (1).mp3").exists());
}

#[tokio::test]
async fn http_error_reports_download_failed_and_leaves_no_file() {
    let server = common::audio_server::start(b"unused".to_vec());
    let h = harness(local_config()).await;

    let r = h.orch.handle(download(server.url("missing.mp3"), "1")).await;
    assert_eq!(r.reason, Some(Reason::DownloadFailed));
    assert!(!h.downloads.path().join("dictor/0001_dictor.mp3").exists());
    assert!(h.orch.store().recent_history(10).await.unwrap().is_empty());

    let errors = h.orch.store().recent_errors(5).await.unwrap();
    assert!(errors.iter().any(|e| e.message == "download failed"));
}

#[tokio::test]
async fn stalled_server_times_out() {
    let server = common::audio_server::start_with_options(
        b"late".to_vec(),
        common::audio_server::AudioServerOptions {
            delay: Some(Duration::from_secs(3)),
        },
    );
    let mut cfg = local_config();
    cfg.timing.download_timeout_secs = 1;
    let h = harness(cfg).await;

    let r = h.orch.handle(download(server.url("slow.mp3"), "1")).await;
    assert_eq!(r.reason, Some(Reason::DownloadTimeout));
}

#[test]
fn curl_timeout_is_typed_and_leaves_no_file() {
    let server = common::audio_server::start_with_options(
        b"late".to_vec(),
        common::audio_server::AudioServerOptions {
            delay: Some(Duration::from_secs(3)),
        },
    );
    let downloads = tempdir().unwrap();
    let downloader = CurlDownloader::new(downloads.path());
    let request = DownloadRequest {
        url: server.url("slow.mp3"),
        relative_path: "dictor/0001_dictor.mp3".into(),
        timeout: Duration::from_secs(1),
    };

    let err = downloader.download(&request).unwrap_err();
    assert!(err.downcast_ref::<TransferTimedOut>().is_some(), "{err:#}");
    assert!(!downloads.path().join("dictor/0001_dictor.mp3").exists());
}

#[tokio::test]
async fn disallowed_host_is_rejected_before_any_request() {
    let server = common::audio_server::start(b"x".to_vec());
    let h = harness(TtsGrabConfig {
        enabled_by_default: true,
        ..TtsGrabConfig::default()
    })
    .await;

    let r = h.orch.handle(download(server.url("a.mp3"), "1")).await;
    assert_eq!(r.reason, Some(Reason::InvalidUrl));
    assert_eq!(server.hits(), 0);
}

#[tokio::test]
async fn click_on_audio_link_downloads_through_orchestrator() {
    let server = common::audio_server::start(b"ID3 click".to_vec());
    let mut cfg = local_config();
    cfg.urls.link_mode = LinkMode::Domain;
    let h = harness(cfg.clone()).await;

    let interceptor = Interceptor::new(
        h.orch.clone(),
        LinkMatcher::from_config(&cfg.urls).unwrap(),
        h.orch.enabled_state().subscribe(),
        cfg.timing.click_debounce(),
    );

    let page = ClickEvent {
        href: Some(server.url("index.html")),
        tab_id: Some("1".into()),
    };
    assert_eq!(interceptor.on_click(page).await, ClickOutcome::Ignored);

    let audio = ClickEvent {
        href: Some(server.url("moss/a-1.mp3")),
        tab_id: Some("1".into()),
    };
    let outcome = interceptor.on_click(audio.clone()).await;
    assert!(matches!(outcome, ClickOutcome::Downloaded { .. }), "{outcome:?}");
    assert!(h.downloads.path().join("dictor/0001_dictor.mp3").exists());

    h.orch.enabled_state().set(false).await.unwrap();
    tokio::time::sleep(cfg.timing.click_debounce()).await;
    assert_eq!(interceptor.on_click(audio).await, ClickOutcome::PassThrough);
}
