//! First-response race across interchangeable replicas.
//!
//! Every candidate is fetched concurrently; the first successful payload to
//! reach the single-slot result channel wins and the race returns at once.
//! Losers are neither cancelled nor awaited: they run until their own fetch
//! timeout at the latest, and whatever they produce is discarded. Candidate
//! failures stay inside the candidate's task (logged only).
//!
//! "Every candidate failed" is detected by the lifecycle controller's task
//! count, independently of the result channel, so the race cannot hang.
//! Simultaneous successes have no defined winner.

use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::RaceConfig;
use crate::fetch::Fetcher;
use crate::item::{Item, Payload};
use crate::lifecycle::TaskSet;
use crate::task;
use crate::url_model::{self, JoinError};

/// Per-candidate fetch timeout used when nothing else is configured.
pub const DEFAULT_RACE_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// One interchangeable source for the logical item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub item: Item,
}

impl Candidate {
    pub fn new(name: impl Into<String>, item: impl Into<Item>) -> Self {
        Self {
            name: name.into(),
            item: item.into(),
        }
    }
}

/// Whole-race deadline from a seconds setting; never zero.
pub fn deadline_from_secs(secs: u64) -> Duration {
    Duration::from_secs(secs.max(1))
}

#[derive(Debug, Clone)]
pub struct RaceOptions {
    pub fetch_timeout: Duration,
    /// Give up on the whole race after this long, even if candidates are
    /// still running.
    pub deadline: Option<Duration>,
}

impl Default for RaceOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_RACE_FETCH_TIMEOUT,
            deadline: None,
        }
    }
}

#[derive(Debug)]
pub struct RaceWinner {
    pub candidate: String,
    pub payload: Payload,
    pub elapsed: Duration,
}

#[derive(Debug, Error)]
pub enum RaceError {
    #[error("no race candidates configured")]
    NoCandidates,
    #[error("no source responded ({candidates} candidate(s) failed)")]
    NoResponse { candidates: usize },
    #[error("no source responded within {0:?}")]
    DeadlineElapsed(Duration),
    #[error("replica {name}: {source}")]
    InvalidCandidate {
        name: String,
        #[source]
        source: JoinError,
    },
    #[error("asked for {requested} candidate(s) but only {available} replica(s) configured")]
    TooManyCandidates { requested: usize, available: usize },
}

pub struct RaceCoordinator {
    fetcher: Arc<dyn Fetcher>,
    candidates: Vec<Candidate>,
    options: RaceOptions,
}

impl RaceCoordinator {
    pub fn new(fetcher: Arc<dyn Fetcher>, candidates: Vec<Candidate>, options: RaceOptions) -> Self {
        Self {
            fetcher,
            candidates,
            options,
        }
    }

    /// Builds a coordinator from configured replicas.
    ///
    /// `host_url` overrides the configured base URL. `limit` keeps only the
    /// first N replicas.
    pub fn from_config(
        fetcher: Arc<dyn Fetcher>,
        cfg: &RaceConfig,
        host_url: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Self, RaceError> {
        let candidates = resolve_candidates(cfg, host_url, limit)?;
        let options = RaceOptions {
            fetch_timeout: Duration::from_secs(cfg.fetch_timeout_secs.max(1)),
            deadline: cfg.deadline_secs.map(deadline_from_secs),
        };
        Ok(Self::new(fetcher, candidates, options))
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn options(&self) -> &RaceOptions {
        &self.options
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.options.deadline = deadline;
        self
    }

    /// Runs the race once.
    pub async fn race(&self) -> Result<RaceWinner, RaceError> {
        if self.candidates.is_empty() {
            return Err(RaceError::NoCandidates);
        }
        let started = Instant::now();
        let (winner_tx, mut winner_rx) = mpsc::channel::<(String, Payload)>(1);
        let tasks = TaskSet::new();

        for candidate in &self.candidates {
            let fetcher = Arc::clone(&self.fetcher);
            let candidate = candidate.clone();
            let winner_tx = winner_tx.clone();
            let timeout = self.options.fetch_timeout;
            tasks.spawn(async move {
                match task::fetch_item(fetcher.as_ref(), &candidate.item, timeout).await {
                    Ok(payload) => {
                        tracing::debug!(candidate = %candidate.name, bytes = payload.len(), "candidate responded");
                        // full or closed: someone else already won
                        if winner_tx.try_send((candidate.name.clone(), payload)).is_err() {
                            tracing::debug!(candidate = %candidate.name, "late response discarded");
                        }
                    }
                    Err(e) => {
                        tracing::error!(
                            candidate = %candidate.name,
                            item = %candidate.item,
                            error = %e,
                            "candidate failed"
                        );
                    }
                }
            });
        }
        drop(winner_tx);

        let first = match self.options.deadline {
            Some(deadline) => tokio::time::timeout(deadline, tasks.first_of(&mut winner_rx))
                .await
                .map_err(|_| RaceError::DeadlineElapsed(deadline))?,
            None => tasks.first_of(&mut winner_rx).await,
        };
        let (candidate, payload) = first.ok_or(RaceError::NoResponse {
            candidates: self.candidates.len(),
        })?;

        let elapsed = started.elapsed();
        tracing::info!(
            candidate = %candidate,
            bytes = payload.len(),
            elapsed = ?elapsed,
            outstanding = tasks.outstanding(),
            "first response"
        );
        Ok(RaceWinner {
            candidate,
            payload,
            elapsed,
        })
    }
}

/// Resolves configured replicas into candidates, in configuration order.
pub fn resolve_candidates(
    cfg: &RaceConfig,
    host_url: Option<&str>,
    limit: Option<usize>,
) -> Result<Vec<Candidate>, RaceError> {
    let available = cfg.replicas.len();
    let take = match limit {
        Some(requested) if requested > available => {
            return Err(RaceError::TooManyCandidates {
                requested,
                available,
            })
        }
        Some(requested) => requested,
        None => available,
    };
    let base = host_url.or(cfg.host_url.as_deref());
    cfg.replicas
        .iter()
        .take(take)
        .map(|replica| -> Result<Candidate, RaceError> {
            let url = url_model::join_location(base, &replica.location).map_err(|source| {
                RaceError::InvalidCandidate {
                    name: replica.name.clone(),
                    source,
                }
            })?;
            Ok(Candidate::new(replica.name.clone(), url))
        })
        .collect()
}
