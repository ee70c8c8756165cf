//! In-memory collaborators with scripted timing and outcomes.

use async_trait::async_trait;
use fetchpool_core::fetch::{FetchError, Fetcher};
use fetchpool_core::item::{Item, Payload};
use fetchpool_core::source::{EnumerateError, ItemSource};
use fetchpool_core::store::{Store, StoreError};
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// What a scripted fetch does for one item.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Succeed after `delay` with the item id as body.
    Ok(Duration),
    /// Fail with HTTP 500 after `delay`.
    Fail(Duration),
    /// Never answer on its own.
    Hang,
}

pub struct ScriptedFetcher {
    steps: HashMap<String, Step>,
    default: Step,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            steps: HashMap::new(),
            default: Step::Ok(Duration::ZERO),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, item: &str, step: Step) -> Self {
        self.steps.insert(item.to_string(), step);
        self
    }

    pub fn with_default(mut self, step: Step) -> Self {
        self.default = step;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, item: &Item, _timeout: Duration) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.steps.get(item.as_str()).copied().unwrap_or(self.default) {
            Step::Ok(delay) => {
                tokio::time::sleep(delay).await;
                Ok(item.as_str().as_bytes().to_vec())
            }
            Step::Fail(delay) => {
                tokio::time::sleep(delay).await;
                Err(FetchError::Http(500))
            }
            Step::Hang => {
                std::future::pending::<()>().await;
                Ok(Vec::new())
            }
        }
    }
}

/// Records stored items and how many stores ran at once.
pub struct RecordingStore {
    delay: Duration,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    stored: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            delay: Duration::ZERO,
            failing: HashSet::new(),
            panicking: HashSet::new(),
            stored: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self, item: &str) -> Self {
        self.failing.insert(item.to_string());
        self
    }

    pub fn panicking(mut self, item: &str) -> Self {
        self.panicking.insert(item.to_string());
        self
    }

    /// Stored item ids, sorted.
    pub fn stored(&self) -> Vec<String> {
        let mut stored = self.stored.lock().unwrap().clone();
        stored.sort();
        stored
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for RecordingStore {
    async fn store(&self, payload: Payload) -> Result<PathBuf, StoreError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let id = payload.item().as_str().to_string();
        if self.panicking.contains(&id) {
            panic!("store crashed on {id}");
        }
        if self.failing.contains(&id) {
            return Err(StoreError::Io {
                path: PathBuf::from(&id),
                source: io::Error::new(io::ErrorKind::Other, "disk full"),
            });
        }
        self.stored.lock().unwrap().push(id.clone());
        Ok(PathBuf::from(id))
    }
}

/// Yields its items, then fails instead of ending.
pub struct BrokenSource {
    items: VecDeque<Item>,
    yielded: usize,
}

impl BrokenSource {
    pub fn new(items: &[&str]) -> Self {
        Self {
            items: items.iter().map(|s| Item::from(*s)).collect(),
            yielded: 0,
        }
    }
}

#[async_trait]
impl ItemSource for BrokenSource {
    async fn next_item(&mut self) -> Result<Option<Item>, EnumerateError> {
        match self.items.pop_front() {
            Some(item) => {
                self.yielded += 1;
                Ok(Some(item))
            }
            None => Err(EnumerateError::Read {
                line: self.yielded + 1,
                source: io::Error::new(io::ErrorKind::InvalidData, "truncated listing"),
            }),
        }
    }
}
