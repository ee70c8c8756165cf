//! CLI for fetchpool.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use fetchpool_core::config;
use std::path::PathBuf;

use commands::{run_config, run_fanout, run_pipeline, run_race};

/// Top-level CLI for fetchpool.
#[derive(Debug, Parser)]
#[command(name = "fetchpool")]
#[command(about = "fetchpool: concurrent download orchestration", long_about = None)]
pub struct Cli {
    /// Log per-item progress (also enabled by DEBUG=true).
    #[arg(long, global = true)]
    pub debug: bool,

    /// Log to stderr instead of the state log file.
    #[arg(long, global = true)]
    pub log_stderr: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Where fetched payloads are written.
#[derive(Debug, Clone, Args)]
pub struct DestArgs {
    /// Directory to write into (default: config `download_dir`, then the current directory).
    #[arg(long, value_name = "DIR", conflicts_with = "scratch")]
    pub dest: Option<PathBuf>,

    /// Write into a throwaway temporary directory that is removed on exit.
    #[arg(long)]
    pub scratch: bool,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch and store every listed URL at once, one task per URL.
    Fanout {
        /// File with one URL per line.
        #[arg(long, env = "CONTENT_FILE", value_name = "FILE")]
        source: PathBuf,

        /// Per-item fetch timeout in seconds (default: config).
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        #[command(flatten)]
        dest: DestArgs,
    },

    /// Fetch listed URLs in order and store them with a fixed pool of consumers.
    Pipeline {
        /// File with one URL per line.
        #[arg(long, env = "CONTENT_FILE", value_name = "FILE")]
        source: PathBuf,

        /// Number of consumers storing payloads (default: config).
        #[arg(long, value_name = "K")]
        consumers: Option<usize>,

        /// Per-item fetch timeout in seconds (default: config).
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Pause before every store, to make backpressure visible.
        #[arg(long, value_name = "MS")]
        store_delay_ms: Option<u64>,

        #[command(flatten)]
        dest: DestArgs,
    },

    /// Race the configured replicas and keep the first successful response.
    Race {
        /// Base URL for relative replica locations (default: config `race.host_url`).
        #[arg(long, env = "API_HOST_URL", value_name = "URL")]
        host: Option<String>,

        /// Race only the first N configured replicas.
        #[arg(long, value_name = "N")]
        candidates: Option<usize>,

        /// Give up after this many seconds (minimum 1) even if replicas are still running.
        #[arg(long, value_name = "SECS")]
        deadline: Option<u64>,

        #[command(flatten)]
        dest: DestArgs,
    },

    /// Show the config file location and the effective configuration.
    Config,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command {
            CliCommand::Fanout {
                source,
                timeout,
                dest,
            } => run_fanout(&cfg, &source, timeout, &dest).await?,
            CliCommand::Pipeline {
                source,
                consumers,
                timeout,
                store_delay_ms,
                dest,
            } => run_pipeline(&cfg, &source, consumers, timeout, store_delay_ms, &dest).await?,
            CliCommand::Race {
                host,
                candidates,
                deadline,
                dest,
            } => run_race(&cfg, host.as_deref(), candidates, deadline, &dest).await?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
