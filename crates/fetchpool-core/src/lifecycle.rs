//! Completion tracking for groups of concurrent tasks.
//!
//! A [`TaskSet`] counts tasks launched through it and tasks that have
//! finished. Every task finishes exactly once: the count is taken by a guard
//! that drops when the task's future completes, errors or panics. On top of
//! the counters it offers the three synchronization points the orchestration
//! patterns need: [`join_all`](TaskSet::join_all),
//! [`join_all_then_close`](TaskSet::join_all_then_close) and
//! [`first_of`](TaskSet::first_of).

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

use crate::handoff::HandoffSender;

#[derive(Debug, Default)]
struct Counters {
    launched: AtomicUsize,
    finished: AtomicUsize,
    changed: Notify,
}

impl Counters {
    fn is_idle(&self) -> bool {
        let launched = self.launched.load(Ordering::Acquire);
        self.finished.load(Ordering::Acquire) >= launched
    }
}

/// Shared launch/finish bookkeeping. Clones refer to the same set.
#[derive(Debug, Clone, Default)]
pub struct TaskSet {
    counters: Arc<Counters>,
}

/// Marks one task finished when dropped.
#[derive(Debug)]
struct CompletionGuard {
    counters: Arc<Counters>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let counters = &self.counters;
        // finished never passes launched
        let _ = counters
            .finished
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |finished| {
                (finished < counters.launched.load(Ordering::Acquire)).then_some(finished + 1)
            });
        counters.changed.notify_waiters();
    }
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `future` on the runtime and tracks it.
    ///
    /// The returned handle may be awaited for the output or dropped; dropping
    /// it detaches the task without affecting the bookkeeping.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let guard = self.launch();
        tokio::spawn(async move {
            let _guard = guard;
            future.await
        })
    }

    fn launch(&self) -> CompletionGuard {
        self.counters.launched.fetch_add(1, Ordering::AcqRel);
        CompletionGuard {
            counters: Arc::clone(&self.counters),
        }
    }

    pub fn launched(&self) -> usize {
        self.counters.launched.load(Ordering::Acquire)
    }

    pub fn finished(&self) -> usize {
        self.counters.finished.load(Ordering::Acquire)
    }

    pub fn outstanding(&self) -> usize {
        self.launched().saturating_sub(self.finished())
    }

    /// Waits until every task launched so far has finished. Returns at once
    /// for an empty set.
    pub async fn join_all(&self) {
        loop {
            let changed = self.counters.changed.notified();
            tokio::pin!(changed);
            // register before checking so a finish in between is not missed
            changed.as_mut().enable();
            if self.counters.is_idle() {
                return;
            }
            changed.await;
        }
    }

    /// [`join_all`](Self::join_all), then closes `channel`.
    ///
    /// Returns whether this call performed the close; a channel that was
    /// already closed is left alone.
    pub async fn join_all_then_close<T>(&self, channel: &HandoffSender<T>) -> bool {
        self.join_all().await;
        channel.close().await
    }

    /// Waits for the first value on `results`, or for every task to finish
    /// without one, whichever comes first.
    ///
    /// Tasks must send before they finish; a value sent by the last task is
    /// still picked up after the set goes idle.
    pub async fn first_of<T>(&self, results: &mut mpsc::Receiver<T>) -> Option<T> {
        tokio::select! {
            biased;
            Some(value) = results.recv() => Some(value),
            () = self.join_all() => results.try_recv().ok(),
        }
    }
}
