//! Store collaborator: persist one payload under a fresh name.
//!
//! [`DirStore`] writes each payload into a destination directory using a
//! collision-free name derived from the payload's item.

mod dir;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::item::Payload;

pub use dir::{DirStore, DEFAULT_PREFIX};

/// Why a payload could not be persisted. The item is lost; siblings go on.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot write into {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The blocking worker doing the write panicked or was cancelled.
    #[error("store worker failed: {0}")]
    Worker(String),
}

/// Persists payloads and returns a handle (the written path).
///
/// Every call must produce a new name; storing the same item twice yields two
/// files.
#[async_trait]
pub trait Store: Send + Sync {
    async fn store(&self, payload: Payload) -> Result<PathBuf, StoreError>;
}
