//! CLI command handlers, one file per command.

mod config;
mod dest;
mod fanout;
mod pipeline;
mod race;

pub use config::run_config;
pub use fanout::run_fanout;
pub use pipeline::run_pipeline;
pub use race::run_race;

use fetchpool_core::config::FetchpoolConfig;
use fetchpool_core::task::BatchSummary;
use std::path::Path;
use std::time::Duration;

/// Flag value if given, otherwise the configured per-item timeout.
fn fetch_timeout(flag: Option<u64>, cfg: &FetchpoolConfig) -> Duration {
    flag.map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or_else(|| cfg.fetch_timeout())
}

fn print_summary(label: &str, summary: &BatchSummary, dir: &Path) {
    println!(
        "{label}: {} item(s), {} stored, {} failed, into {}",
        summary.items,
        summary.stored,
        summary.failures(),
        dir.display()
    );
    if summary.lost() > 0 {
        println!("{label}: {} item(s) lost to crashed tasks", summary.lost());
    }
}
