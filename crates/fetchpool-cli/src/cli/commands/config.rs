//! `fetchpool config` – show where the config lives and what it says.

use anyhow::Result;
use fetchpool_core::config::{self, FetchpoolConfig};

pub fn run_config(cfg: &FetchpoolConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
