//! HTTP GET with libcurl on a blocking worker thread.

use async_trait::async_trait;
use std::time::Duration;

use super::{FetchError, Fetcher};
use crate::item::Item;

/// Upper bound for establishing the connection; the whole transfer is still
/// bounded by the per-call timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default [`Fetcher`]: follows redirects and buffers the body in memory.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    connect_timeout: Duration,
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl CurlFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
}

#[async_trait]
impl Fetcher for CurlFetcher {
    async fn fetch(&self, item: &Item, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        let url = item.as_str().to_string();
        let connect_timeout = self.connect_timeout.min(timeout);
        tokio::task::spawn_blocking(move || get(&url, connect_timeout, timeout))
            .await
            .map_err(|e| FetchError::Worker(e.to_string()))?
    }
}

/// Performs the GET in the current thread.
fn get(url: &str, connect_timeout: Duration, timeout: Duration) -> Result<Vec<u8>, FetchError> {
    let mut body = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.connect_timeout(connect_timeout)?;
    easy.timeout(timeout)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform().map_err(|e| {
            if e.is_operation_timedout() {
                FetchError::Timeout(timeout)
            } else {
                FetchError::Curl(e)
            }
        })?;
    }

    // Non-HTTP schemes (file://) report 0.
    let code = easy.response_code()?;
    if code != 0 && !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }

    Ok(body)
}
