use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::pipeline::DEFAULT_CONSUMERS;
use crate::store::DEFAULT_PREFIX;

/// One named replica of the race target. `location` is an absolute URL or a
/// path relative to the race host URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replica {
    pub name: String,
    pub location: String,
}

impl Replica {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }
}

/// First-response race settings (`[race]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Base URL that relative replica locations are joined onto.
    #[serde(default)]
    pub host_url: Option<String>,
    /// Per-candidate fetch timeout in seconds.
    #[serde(default = "default_race_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Optional cap on the whole race, in seconds.
    #[serde(default)]
    pub deadline_secs: Option<u64>,
    /// Candidates, raced in this order.
    #[serde(default = "default_replicas")]
    pub replicas: Vec<Replica>,
}

fn default_race_fetch_timeout_secs() -> u64 {
    5
}

fn default_replicas() -> Vec<Replica> {
    vec![
        Replica::new("storage0", "0cf50f1c99234954b00340471538ce9d.MOV"),
        Replica::new("storage1", "0db9a58b669048dc999eb8f11f7ba424.MOV"),
        Replica::new("storage2", "0d38ceda70b14ccfaf6960514615757f.MOV"),
    ]
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            host_url: None,
            fetch_timeout_secs: default_race_fetch_timeout_secs(),
            deadline_secs: None,
            replicas: default_replicas(),
        }
    }
}

/// Global configuration loaded from `~/.config/fetchpool/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchpoolConfig {
    /// Per-item fetch timeout in seconds (fan-out and pipeline).
    pub fetch_timeout_secs: u64,
    /// Pipeline consumer pool size.
    pub consumers: usize,
    /// Where payloads are written; the current directory when unset.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Prefix for stored file names.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    #[serde(default)]
    pub race: RaceConfig,
}

fn default_file_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

impl Default for FetchpoolConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 10,
            consumers: DEFAULT_CONSUMERS,
            download_dir: None,
            file_prefix: default_file_prefix(),
            race: RaceConfig::default(),
        }
    }
}

impl FetchpoolConfig {
    /// Per-item fetch timeout; never zero.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("fetchpool")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchpoolConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetchpoolConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: FetchpoolConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
