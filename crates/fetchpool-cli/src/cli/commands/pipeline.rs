//! `fetchpool pipeline` – sequential producer, bounded consumer pool.

use anyhow::Result;
use fetchpool_core::config::FetchpoolConfig;
use fetchpool_core::fetch::CurlFetcher;
use fetchpool_core::pipeline::{Pipeline, PipelineOptions};
use fetchpool_core::source::LineSource;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::dest::Destination;
use crate::cli::DestArgs;

pub async fn run_pipeline(
    cfg: &FetchpoolConfig,
    source: &Path,
    consumers: Option<usize>,
    timeout: Option<u64>,
    store_delay_ms: Option<u64>,
    dest: &DestArgs,
) -> Result<()> {
    let started = Instant::now();
    let destination = Destination::resolve(dest, cfg)?;
    let items = LineSource::open(source).await?;

    let options = PipelineOptions {
        consumers: consumers.unwrap_or(cfg.consumers),
        fetch_timeout: super::fetch_timeout(timeout, cfg),
        store_delay: store_delay_ms.map(Duration::from_millis),
    };
    let pipeline = Pipeline::new(
        Arc::new(CurlFetcher::new()),
        Arc::new(destination.store(cfg)),
        options,
    );

    let mut states = pipeline.subscribe();
    let watcher = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = *states.borrow_and_update();
            tracing::debug!(?state, "pipeline state");
        }
    });
    let result = pipeline.run(Box::new(items)).await;
    watcher.abort();
    let summary = result?;

    super::print_summary("pipeline", &summary, destination.dir());
    println!("Execution time: {:.2?}", started.elapsed());
    Ok(())
}
