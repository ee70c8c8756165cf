//! Destination directory for stored payloads.

use anyhow::{Context, Result};
use fetchpool_core::config::FetchpoolConfig;
use fetchpool_core::store::DirStore;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::cli::DestArgs;

/// Resolved output directory. A scratch directory is removed when this is
/// dropped.
pub struct Destination {
    dir: PathBuf,
    _scratch: Option<TempDir>,
}

impl Destination {
    /// `--scratch`, then `--dest`, then config `download_dir`, then the
    /// current directory.
    pub fn resolve(args: &DestArgs, cfg: &FetchpoolConfig) -> Result<Self> {
        if args.scratch {
            let scratch = tempfile::Builder::new()
                .prefix("fetchpool-")
                .tempdir()
                .context("cannot create scratch directory")?;
            tracing::info!("writing into scratch directory {}", scratch.path().display());
            return Ok(Self {
                dir: scratch.path().to_path_buf(),
                _scratch: Some(scratch),
            });
        }

        let dir = match args.dest.clone().or_else(|| cfg.download_dir.clone()) {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create destination {}", dir.display()))?;
        Ok(Self {
            dir,
            _scratch: None,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn store(&self, cfg: &FetchpoolConfig) -> DirStore {
        DirStore::new(&self.dir).with_prefix(cfg.file_prefix.clone())
    }
}
