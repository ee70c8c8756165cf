//! End-to-end tests: libcurl fetches against a local HTTP server.

mod common;

use common::http_server::{self, Route};
use fetchpool_core::config::{RaceConfig, Replica};
use fetchpool_core::fanout::FanOut;
use fetchpool_core::fetch::{CurlFetcher, FetchError, Fetcher};
use fetchpool_core::item::Item;
use fetchpool_core::pipeline::{Pipeline, PipelineOptions};
use fetchpool_core::race::RaceCoordinator;
use fetchpool_core::source::VecSource;
use fetchpool_core::store::DirStore;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn dir_contents(dir: &std::path::Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<(String, Vec<u8>)> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let e = e.unwrap();
            (
                e.file_name().to_string_lossy().into_owned(),
                std::fs::read(e.path()).unwrap(),
            )
        })
        .collect();
    files.sort();
    files
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn curl_fetches_body() {
    let body: Vec<u8> = (0u8..=255).cycle().take(32 * 1024).collect();
    let base = http_server::start(vec![("clip.mov", Route::ok(&body))]);

    let got = CurlFetcher::new()
        .fetch(&Item::new(format!("{base}clip.mov")), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(got, body);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn curl_reports_http_status() {
    let base = http_server::start(vec![("broken", Route::status(503))]);
    let fetcher = CurlFetcher::new();

    let err = fetcher
        .fetch(&Item::new(format!("{base}missing")), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Http(404)));

    let err = fetcher
        .fetch(&Item::new(format!("{base}broken")), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Http(503)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn curl_times_out_on_slow_server() {
    let base = http_server::start(vec![(
        "slow",
        Route::ok(b"late").delayed(Duration::from_secs(3)),
    )]);
    let err = CurlFetcher::new()
        .fetch(&Item::new(format!("{base}slow")), Duration::from_millis(300))
        .await
        .unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fanout_downloads_into_directory() {
    let base = http_server::start(vec![
        ("a.mov", Route::ok(b"alpha")),
        ("b.mov", Route::ok(b"bravo")),
    ]);
    let dir = tempdir().unwrap();
    let summary = FanOut::new(Arc::new(CurlFetcher::new()), Arc::new(DirStore::new(dir.path())))
        .run_items([
            format!("{base}a.mov"),
            format!("{base}b.mov"),
            format!("{base}gone.mov"),
        ])
        .await;

    assert_eq!(summary.stored, 2);
    assert_eq!(summary.fetch_failures, 1);
    let files = dir_contents(dir.path());
    assert_eq!(files.len(), 2);
    assert!(files[0].0.starts_with("fetch_a_"));
    assert_eq!(files[0].1, b"alpha");
    assert!(files[1].0.starts_with("fetch_b_"));
    assert_eq!(files[1].1, b"bravo");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pipeline_downloads_into_directory() {
    let routes: Vec<(String, Route)> = (0..6)
        .map(|i| (format!("v{i}.MOV"), Route::ok(format!("video {i}").as_bytes())))
        .collect();
    let base = http_server::start(routes.iter().map(|(p, r)| (p.as_str(), r.clone())).collect());
    let dir = tempdir().unwrap();
    let items: Vec<String> = (0..6).map(|i| format!("{base}v{i}.MOV")).collect();

    let summary = Pipeline::new(
        Arc::new(CurlFetcher::new()),
        Arc::new(DirStore::new(dir.path()).with_prefix("go_")),
        PipelineOptions::default(),
    )
    .run(Box::new(VecSource::new(items)))
    .await
    .unwrap();

    assert_eq!(summary.stored, 6);
    let files = dir_contents(dir.path());
    assert_eq!(files.len(), 6);
    assert!(files.iter().all(|(name, _)| name.starts_with("go_v") && name.ends_with(".MOV")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn race_over_configured_replicas() {
    let base = http_server::start(vec![
        ("slow.MOV", Route::ok(b"slow copy").delayed(Duration::from_millis(800))),
        ("fast.MOV", Route::ok(b"fast copy").delayed(Duration::from_millis(50))),
    ]);
    let cfg = RaceConfig {
        host_url: Some(base),
        replicas: vec![
            Replica::new("storage0", "missing.MOV"),
            Replica::new("storage1", "slow.MOV"),
            Replica::new("storage2", "fast.MOV"),
        ],
        ..RaceConfig::default()
    };

    let coordinator =
        RaceCoordinator::from_config(Arc::new(CurlFetcher::new()), &cfg, None, None).unwrap();
    let winner = coordinator.race().await.unwrap();

    assert_eq!(winner.candidate, "storage2");
    assert_eq!(winner.payload.body(), b"fast copy");
}
