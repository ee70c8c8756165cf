//! `fetchpool fanout` – one task per listed URL.

use anyhow::Result;
use fetchpool_core::config::FetchpoolConfig;
use fetchpool_core::fanout::FanOut;
use fetchpool_core::fetch::CurlFetcher;
use fetchpool_core::source::LineSource;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use super::dest::Destination;
use crate::cli::DestArgs;

pub async fn run_fanout(
    cfg: &FetchpoolConfig,
    source: &Path,
    timeout: Option<u64>,
    dest: &DestArgs,
) -> Result<()> {
    let started = Instant::now();
    let destination = Destination::resolve(dest, cfg)?;
    let mut items = LineSource::open(source).await?;

    let fanout = FanOut::new(Arc::new(CurlFetcher::new()), Arc::new(destination.store(cfg)))
        .with_fetch_timeout(super::fetch_timeout(timeout, cfg));
    let summary = fanout.run(&mut items).await?;

    super::print_summary("fan-out", &summary, destination.dir());
    println!("Execution time: {:.2?}", started.elapsed());
    Ok(())
}
