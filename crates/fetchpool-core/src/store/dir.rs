//! Directory-backed store.

use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{Store, StoreError};
use crate::item::Payload;
use crate::url_model;

/// Prefix put in front of every stored file name.
pub const DEFAULT_PREFIX: &str = "fetch_";

/// Random characters between the hint stem and its extension.
const RANDOM_LEN: usize = 8;

/// Writes payloads into `dir` as `<prefix><stem>_<random><ext>`.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
    prefix: String,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl Store for DirStore {
    async fn store(&self, payload: Payload) -> Result<PathBuf, StoreError> {
        let dir = self.dir.clone();
        let prefix = self.prefix.clone();
        tokio::task::spawn_blocking(move || write_unique(&dir, &prefix, &payload))
            .await
            .map_err(|e| StoreError::Worker(e.to_string()))?
    }
}

/// Creates a new uniquely named file in `dir` and writes the payload body.
fn write_unique(dir: &Path, prefix: &str, payload: &Payload) -> Result<PathBuf, StoreError> {
    let io_err = |source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let hint = url_model::destination_hint(payload.item().as_str());
    let (stem, ext) = url_model::split_extension(&hint);
    let name_prefix = format!("{prefix}{stem}_");

    let mut file = tempfile::Builder::new()
        .prefix(&name_prefix)
        .suffix(ext)
        .rand_bytes(RANDOM_LEN)
        .tempfile_in(dir)
        .map_err(io_err)?;
    file.write_all(payload.body()).map_err(io_err)?;
    let (_, path) = file.keep().map_err(|e| io_err(e.error))?;
    Ok(path)
}
