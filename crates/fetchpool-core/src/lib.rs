//! fetchpool core: retrieve remote items and persist them under one of three
//! concurrency policies.
//!
//! - [`fanout::FanOut`]: one task per item, no cap.
//! - [`pipeline::Pipeline`]: sequential producer, fixed consumer pool, zero
//!   capacity handoff between them.
//! - [`race::RaceCoordinator`]: first successful replica wins.
//!
//! All three track their tasks with [`lifecycle::TaskSet`] and reach the
//! outside world only through the [`fetch::Fetcher`], [`store::Store`] and
//! [`source::ItemSource`] traits.

pub mod config;
pub mod logging;

pub mod fanout;
pub mod fetch;
pub mod handoff;
pub mod item;
pub mod lifecycle;
pub mod pipeline;
pub mod race;
pub mod source;
pub mod store;
pub mod task;
pub mod url_model;
