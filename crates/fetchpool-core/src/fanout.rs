//! Unbounded fan-out: one task per item, all at once.
//!
//! Each task fetches and stores its item independently. The run returns once
//! every task has finished; a failing (or panicking) item never stops its
//! siblings. There is no concurrency cap, so callers bound the item count.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::fetch::Fetcher;
use crate::item::Item;
use crate::lifecycle::TaskSet;
use crate::source::ItemSource;
use crate::store::Store;
use crate::task::{self, BatchSummary, EnumerationAborted, Tally, DEFAULT_FETCH_TIMEOUT};

pub struct FanOut {
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn Store>,
    fetch_timeout: Duration,
}

impl FanOut {
    pub fn new(fetcher: Arc<dyn Fetcher>, store: Arc<dyn Store>) -> Self {
        Self {
            fetcher,
            store,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Runs one task per item of `items` and waits for all of them.
    pub async fn run_items<I>(&self, items: I) -> BatchSummary
    where
        I: IntoIterator,
        I::Item: Into<Item>,
    {
        let started = Instant::now();
        let tally = Arc::new(Tally::default());
        let tasks = TaskSet::new();
        for item in items {
            self.launch(&tasks, item.into(), &tally);
        }
        self.finish(&tasks, &tally, started).await
    }

    /// Launches a task for each item as soon as `source` yields it.
    ///
    /// If enumeration fails, tasks already launched are still awaited before
    /// the error is returned.
    pub async fn run(&self, source: &mut dyn ItemSource) -> Result<BatchSummary, EnumerationAborted> {
        let started = Instant::now();
        let tally = Arc::new(Tally::default());
        let tasks = TaskSet::new();
        let enumerated = loop {
            match source.next_item().await {
                Ok(Some(item)) => self.launch(&tasks, item, &tally),
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        let summary = self.finish(&tasks, &tally, started).await;
        match enumerated {
            Ok(()) => Ok(summary),
            Err(source) => {
                tracing::error!(error = %source, "cannot read item source");
                Err(EnumerationAborted { source, summary })
            }
        }
    }

    fn launch(&self, tasks: &TaskSet, item: Item, tally: &Arc<Tally>) {
        tally.record_item();
        let fetcher = Arc::clone(&self.fetcher);
        let store = Arc::clone(&self.store);
        let tally = Arc::clone(tally);
        let timeout = self.fetch_timeout;
        tasks.spawn(async move {
            task::fetch_and_store(fetcher.as_ref(), store.as_ref(), &item, timeout, &tally).await;
        });
    }

    async fn finish(&self, tasks: &TaskSet, tally: &Tally, started: Instant) -> BatchSummary {
        tasks.join_all().await;
        let summary = tally.summary(started.elapsed());
        tracing::info!(
            items = summary.items,
            stored = summary.stored,
            failed = summary.failures(),
            elapsed = ?summary.elapsed,
            "fan-out finished"
        );
        summary
    }
}
