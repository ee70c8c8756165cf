//! Per-item work shared by the fan-out runner and the pipeline.
//!
//! Every fetch goes through [`fetch_item`], which bounds the call with the
//! fetch timeout even if the fetcher ignores it. Outcomes are logged here
//! and counted in a [`Tally`]; errors never leave the item's task.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;

use crate::fetch::{FetchError, Fetcher};
use crate::item::{Item, Payload};
use crate::source::EnumerateError;
use crate::store::Store;

/// Per-fetch timeout used when nothing else is configured.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Counts of one batch run (fan-out or pipeline), plus wall-clock duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Items enumerated and started.
    pub items: usize,
    pub stored: usize,
    pub fetch_failures: usize,
    pub store_failures: usize,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn failures(&self) -> usize {
        self.fetch_failures + self.store_failures
    }

    /// Items that neither stored nor reported a failure (their task panicked).
    pub fn lost(&self) -> usize {
        self.items
            .saturating_sub(self.stored)
            .saturating_sub(self.failures())
    }

    /// True when every item was stored.
    pub fn is_complete(&self) -> bool {
        self.stored == self.items
    }
}

/// Enumeration stopped the batch early. Items enumerated before the failure
/// were still processed; their counts are in `summary`.
#[derive(Debug, Error)]
#[error("item enumeration stopped after {} item(s): {source}", .summary.items)]
pub struct EnumerationAborted {
    #[source]
    pub source: EnumerateError,
    pub summary: BatchSummary,
}

/// Shared counters updated by item tasks.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    items: AtomicUsize,
    stored: AtomicUsize,
    fetch_failures: AtomicUsize,
    store_failures: AtomicUsize,
}

impl Tally {
    pub(crate) fn record_item(&self) {
        self.items.fetch_add(1, Ordering::Relaxed);
    }

    fn record_stored(&self) {
        self.stored.fetch_add(1, Ordering::Relaxed);
    }

    fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn summary(&self, elapsed: Duration) -> BatchSummary {
        BatchSummary {
            items: self.items.load(Ordering::Acquire),
            stored: self.stored.load(Ordering::Acquire),
            fetch_failures: self.fetch_failures.load(Ordering::Acquire),
            store_failures: self.store_failures.load(Ordering::Acquire),
            elapsed,
        }
    }
}

/// Fetches one item, bounded by `timeout`.
pub async fn fetch_item(
    fetcher: &dyn Fetcher,
    item: &Item,
    timeout: Duration,
) -> Result<Payload, FetchError> {
    tracing::debug!(item = %item, "begin downloading");
    let body = tokio::time::timeout(timeout, fetcher.fetch(item, timeout))
        .await
        .map_err(|_| FetchError::Timeout(timeout))??;
    tracing::debug!(item = %item, bytes = body.len(), "downloaded");
    Ok(Payload::new(item.clone(), body))
}

/// Fetches and counts; failures are logged and yield `None`.
pub(crate) async fn fetch_counted(
    fetcher: &dyn Fetcher,
    item: &Item,
    timeout: Duration,
    tally: &Tally,
) -> Option<Payload> {
    match fetch_item(fetcher, item, timeout).await {
        Ok(payload) => Some(payload),
        Err(e) => {
            tally.record_fetch_failure();
            tracing::error!(item = %item, error = %e, "cannot download content");
            None
        }
    }
}

/// Stores one payload and counts the outcome; failures are logged and yield
/// `None`.
pub(crate) async fn store_counted(
    store: &dyn Store,
    payload: Payload,
    tally: &Tally,
) -> Option<PathBuf> {
    let item = payload.item().clone();
    match store.store(payload).await {
        Ok(path) => {
            tally.record_stored();
            tracing::debug!(item = %item, path = %path.display(), "finished writing");
            Some(path)
        }
        Err(e) => {
            tally.record_store_failure();
            tracing::error!(item = %item, error = %e, "cannot save content");
            None
        }
    }
}

/// Full fan-out item task: fetch, then store.
pub(crate) async fn fetch_and_store(
    fetcher: &dyn Fetcher,
    store: &dyn Store,
    item: &Item,
    timeout: Duration,
    tally: &Tally,
) {
    if let Some(payload) = fetch_counted(fetcher, item, timeout, tally).await {
        store_counted(store, payload, tally).await;
    }
}
