//! Bounded producer/consumer pipeline.
//!
//! One producer enumerates items and fetches them in order. A fixed pool of
//! consumers stores the payloads. Payloads cross a zero-capacity
//! [`handoff`](crate::handoff) channel, so the producer stalls whenever every
//! consumer is busy storing: the pool size caps concurrent stores and is the
//! only backpressure.
//!
//! Termination: once the producer task has finished (for any reason), the
//! lifecycle controller closes the channel exactly once. Each consumer exits
//! when its receive observes the close, and the run is done when all of them
//! have.

use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::watch;

use crate::fetch::Fetcher;
use crate::handoff::{self, HandoffClosed, HandoffReceiver, HandoffSender};
use crate::item::Payload;
use crate::lifecycle::TaskSet;
use crate::source::{EnumerateError, ItemSource};
use crate::store::Store;
use crate::task::{self, BatchSummary, EnumerationAborted, Tally, DEFAULT_FETCH_TIMEOUT};

/// Consumer pool size used when nothing else is configured.
pub const DEFAULT_CONSUMERS: usize = 3;

/// Lifecycle of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Starting,
    ProducingAndConsuming,
    /// Channel closed; consumers finishing their last store.
    Draining,
    Done,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Number of consumers, fixed for the run. Must be at least 1.
    pub consumers: usize,
    pub fetch_timeout: Duration,
    /// Artificial pause before each store, to make backpressure visible.
    pub store_delay: Option<Duration>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            consumers: DEFAULT_CONSUMERS,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            store_delay: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("consumer pool size must be at least 1")]
    NoConsumers,
    #[error(transparent)]
    Enumeration(#[from] EnumerationAborted),
    #[error("producer task failed: {0}")]
    Producer(String),
}

pub struct Pipeline {
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn Store>,
    options: PipelineOptions,
    state: watch::Sender<PipelineState>,
}

impl Pipeline {
    pub fn new(fetcher: Arc<dyn Fetcher>, store: Arc<dyn Store>, options: PipelineOptions) -> Self {
        let (state, _) = watch::channel(PipelineState::Starting);
        Self {
            fetcher,
            store,
            options,
            state,
        }
    }

    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    /// Observe state transitions of the current or next run.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// Runs the pipeline over `source` until every enumerated item has been
    /// stored or dropped.
    ///
    /// An enumeration failure stops the producer; the pool still drains what
    /// was already handed over and the error is returned afterwards.
    pub async fn run(&self, source: Box<dyn ItemSource>) -> Result<BatchSummary, PipelineError> {
        let consumers = self.options.consumers;
        if consumers == 0 {
            return Err(PipelineError::NoConsumers);
        }
        let started = Instant::now();
        self.set_state(PipelineState::Starting);

        let tally = Arc::new(Tally::default());
        let (tx, rx) = handoff::channel::<Payload>();

        let pool = TaskSet::new();
        for worker in 0..consumers {
            pool.spawn(consume(
                worker,
                rx.clone(),
                Arc::clone(&self.store),
                Arc::clone(&tally),
                self.options.store_delay,
            ));
        }
        drop(rx);
        tracing::debug!(consumers, "consumers started");

        let producers = TaskSet::new();
        let producer = producers.spawn(produce(
            source,
            Arc::clone(&self.fetcher),
            tx.clone(),
            Arc::clone(&tally),
            self.options.fetch_timeout,
        ));
        self.set_state(PipelineState::ProducingAndConsuming);
        tracing::debug!("producer started");

        producers.join_all_then_close(&tx).await;
        drop(tx);
        self.set_state(PipelineState::Draining);

        pool.join_all().await;
        self.set_state(PipelineState::Done);

        let summary = tally.summary(started.elapsed());
        tracing::info!(
            items = summary.items,
            stored = summary.stored,
            failed = summary.failures(),
            elapsed = ?summary.elapsed,
            "pipeline finished"
        );

        match producer.await {
            Ok(Ok(())) => Ok(summary),
            Ok(Err(source)) => {
                tracing::error!(error = %source, "producer stopped");
                Err(EnumerationAborted { source, summary }.into())
            }
            Err(e) => Err(PipelineError::Producer(e.to_string())),
        }
    }

    fn set_state(&self, state: PipelineState) {
        self.state.send_replace(state);
    }
}

/// Producer stage: enumerate, fetch, hand over. Fetch failures skip the item.
async fn produce(
    mut source: Box<dyn ItemSource>,
    fetcher: Arc<dyn Fetcher>,
    tx: HandoffSender<Payload>,
    tally: Arc<Tally>,
    fetch_timeout: Duration,
) -> Result<(), EnumerateError> {
    while let Some(item) = source.next_item().await? {
        tally.record_item();
        let Some(payload) = task::fetch_counted(fetcher.as_ref(), &item, fetch_timeout, &tally).await
        else {
            continue;
        };
        if let Err(HandoffClosed(payload)) = tx.send(payload).await {
            // only happens if every consumer is gone
            tally.record_store_failure();
            tracing::error!(item = %payload.item(), "no consumer left; stopping producer");
            break;
        }
    }
    Ok(())
}

/// Consumer loop: one store at a time until the channel is closed.
///
/// Each store runs in its own task so a panicking store costs one item, not
/// the consumer.
async fn consume(
    worker: usize,
    rx: HandoffReceiver<Payload>,
    store: Arc<dyn Store>,
    tally: Arc<Tally>,
    store_delay: Option<Duration>,
) {
    while let Some(payload) = rx.recv().await {
        if let Some(delay) = store_delay {
            tokio::time::sleep(delay).await;
        }
        let item = payload.item().clone();
        tracing::debug!(worker, item = %item, bytes = payload.len(), "storing");
        let stored = tokio::spawn({
            let store = Arc::clone(&store);
            let tally = Arc::clone(&tally);
            async move {
                task::store_counted(store.as_ref(), payload, &tally).await;
            }
        })
        .await;
        if let Err(e) = stored {
            tally.record_store_failure();
            tracing::error!(worker, item = %item, error = %e, "cannot save content");
        }
    }
    tracing::debug!(worker, "channel closed; consumer done");
}
