//! Item enumeration: lazy, finite, single-pass sources of items.

mod lines;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::item::Item;

pub use lines::LineSource;

/// Enumeration failure. Fatal to whoever is enumerating; no further items
/// come from the source.
#[derive(Debug, Error)]
pub enum EnumerateError {
    #[error("cannot open item source {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read item source at line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Yields items one at a time until `Ok(None)`.
///
/// After an `Err` the source is spent; callers must not ask for more.
#[async_trait]
pub trait ItemSource: Send {
    async fn next_item(&mut self) -> Result<Option<Item>, EnumerateError>;
}

/// In-memory source over a fixed list.
#[derive(Debug)]
pub struct VecSource {
    items: std::vec::IntoIter<Item>,
}

impl VecSource {
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Item>,
    {
        let items: Vec<Item> = items.into_iter().map(Into::into).collect();
        Self {
            items: items.into_iter(),
        }
    }
}

#[async_trait]
impl ItemSource for VecSource {
    async fn next_item(&mut self) -> Result<Option<Item>, EnumerateError> {
        Ok(self.items.next())
    }
}
