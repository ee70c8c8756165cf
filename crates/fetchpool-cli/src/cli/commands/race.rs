//! `fetchpool race` – first successful replica wins.

use anyhow::{Context, Result};
use fetchpool_core::config::FetchpoolConfig;
use fetchpool_core::fetch::CurlFetcher;
use fetchpool_core::race::{self, RaceCoordinator};
use fetchpool_core::store::Store;
use std::sync::Arc;
use std::time::Instant;

use super::dest::Destination;
use crate::cli::DestArgs;

pub async fn run_race(
    cfg: &FetchpoolConfig,
    host: Option<&str>,
    candidates: Option<usize>,
    deadline: Option<u64>,
    dest: &DestArgs,
) -> Result<()> {
    let started = Instant::now();
    let destination = Destination::resolve(dest, cfg)?;

    let mut coordinator =
        RaceCoordinator::from_config(Arc::new(CurlFetcher::new()), &cfg.race, host, candidates)?;
    if let Some(secs) = deadline {
        coordinator = coordinator.with_deadline(Some(race::deadline_from_secs(secs)));
    }
    for candidate in coordinator.candidates() {
        tracing::debug!(candidate = %candidate.name, item = %candidate.item, "racing");
    }

    let winner = coordinator.race().await?;
    let path = destination
        .store(cfg)
        .store(winner.payload)
        .await
        .context("cannot save winning response")?;

    println!(
        "First response from {} after {:.2?}, saved to {}",
        winner.candidate,
        winner.elapsed,
        path.display()
    );
    println!("Execution time: {:.2?}", started.elapsed());
    Ok(())
}
