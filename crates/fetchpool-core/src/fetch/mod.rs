//! Fetch collaborator: retrieve the bytes behind one item.
//!
//! The orchestration patterns only see the [`Fetcher`] trait. The default
//! implementation, [`CurlFetcher`], performs an HTTP GET with libcurl.

mod curl_get;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::item::Item;

pub use curl_get::CurlFetcher;

/// Why a single fetch failed. Always local to one item.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or read failure reported by curl.
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// The fetch did not finish within its timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// The blocking worker running the transfer panicked or was cancelled.
    #[error("fetch worker failed: {0}")]
    Worker(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::Timeout(_) => true,
            FetchError::Curl(e) => e.is_operation_timedout(),
            _ => false,
        }
    }
}

/// Retrieves the bytes for an item.
///
/// Implementations must give up once `timeout` has elapsed; callers rely on
/// this so that abandoned fetches end on their own.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, item: &Item, timeout: Duration) -> Result<Vec<u8>, FetchError>;
}
