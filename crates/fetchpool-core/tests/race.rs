//! Integration tests for the first-response race.

mod common;

use common::scripted::{ScriptedFetcher, Step};
use fetchpool_core::race::{Candidate, RaceCoordinator, RaceError, RaceOptions};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn candidates() -> Vec<Candidate> {
    vec![
        Candidate::new("storage0", "s0"),
        Candidate::new("storage1", "s1"),
        Candidate::new("storage2", "s2"),
    ]
}

fn coordinator(fetcher: ScriptedFetcher, options: RaceOptions) -> RaceCoordinator {
    RaceCoordinator::new(Arc::new(fetcher), candidates(), options)
}

#[tokio::test]
async fn only_success_wins() {
    let fetcher = ScriptedFetcher::new()
        .with("s0", Step::Fail(Duration::ZERO))
        .with("s1", Step::Ok(Duration::from_millis(50)))
        .with("s2", Step::Fail(Duration::from_millis(10)));

    let winner = coordinator(fetcher, RaceOptions::default()).race().await.unwrap();

    assert_eq!(winner.candidate, "storage1");
    assert_eq!(winner.payload.body(), b"s1");
    assert_eq!(winner.payload.item().as_str(), "s1");
}

#[tokio::test]
async fn fastest_success_wins() {
    let fetcher = ScriptedFetcher::new()
        .with("s0", Step::Ok(Duration::from_millis(400)))
        .with("s1", Step::Ok(Duration::from_millis(300)))
        .with("s2", Step::Ok(Duration::from_millis(10)));

    let started = Instant::now();
    let winner = coordinator(fetcher, RaceOptions::default()).race().await.unwrap();

    assert_eq!(winner.candidate, "storage2");
    assert!(started.elapsed() < Duration::from_millis(250));
}

#[tokio::test]
async fn all_failures_end_the_race_without_waiting() {
    let fetcher = ScriptedFetcher::new().with_default(Step::Fail(Duration::ZERO));
    let options = RaceOptions {
        fetch_timeout: Duration::from_secs(30),
        deadline: None,
    };

    let started = Instant::now();
    let err = coordinator(fetcher, options).race().await.unwrap_err();

    assert!(matches!(err, RaceError::NoResponse { candidates: 3 }));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn winner_returns_before_slow_losers_finish() {
    let fetcher = ScriptedFetcher::new()
        .with("s0", Step::Hang)
        .with("s1", Step::Ok(Duration::from_millis(20)))
        .with("s2", Step::Hang);
    let options = RaceOptions {
        fetch_timeout: Duration::from_secs(10),
        deadline: None,
    };

    let started = Instant::now();
    let winner = coordinator(fetcher, options).race().await.unwrap();

    assert_eq!(winner.candidate, "storage1");
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn hanging_candidates_time_out_into_no_response() {
    let fetcher = ScriptedFetcher::new().with_default(Step::Hang);
    let options = RaceOptions {
        fetch_timeout: Duration::from_millis(50),
        deadline: None,
    };

    let err = coordinator(fetcher, options).race().await.unwrap_err();
    assert!(matches!(err, RaceError::NoResponse { candidates: 3 }));
}

#[tokio::test]
async fn deadline_caps_the_race() {
    let fetcher = ScriptedFetcher::new().with_default(Step::Hang);
    let options = RaceOptions {
        fetch_timeout: Duration::from_secs(30),
        deadline: Some(Duration::from_millis(100)),
    };

    let started = Instant::now();
    let err = coordinator(fetcher, options).race().await.unwrap_err();

    assert!(matches!(err, RaceError::DeadlineElapsed(d) if d == Duration::from_millis(100)));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn no_candidates_is_an_error() {
    let coordinator =
        RaceCoordinator::new(Arc::new(ScriptedFetcher::new()), Vec::new(), RaceOptions::default());
    assert!(matches!(coordinator.race().await, Err(RaceError::NoCandidates)));
}

#[tokio::test]
async fn single_candidate_race() {
    let coordinator = RaceCoordinator::new(
        Arc::new(ScriptedFetcher::new()),
        vec![Candidate::new("only", "s0")],
        RaceOptions::default(),
    );
    let winner = coordinator.race().await.unwrap();
    assert_eq!(winner.candidate, "only");
}
