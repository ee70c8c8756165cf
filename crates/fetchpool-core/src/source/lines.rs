//! Line-oriented item source (one URL per line).

use async_trait::async_trait;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

use super::{EnumerateError, ItemSource};
use crate::item::Item;

/// Reads one item per line. Surrounding whitespace is trimmed; blank lines
/// and lines starting with `#` are skipped.
pub struct LineSource<R> {
    lines: Lines<BufReader<R>>,
    line_no: usize,
}

impl LineSource<tokio::fs::File> {
    /// Opens a file of URLs.
    pub async fn open(path: &Path) -> Result<Self, EnumerateError> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|source| EnumerateError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(file))
    }
}

impl<R: AsyncRead + Unpin + Send> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            line_no: 0,
        }
    }

    /// Number of lines consumed so far (including skipped ones).
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> ItemSource for LineSource<R> {
    async fn next_item(&mut self) -> Result<Option<Item>, EnumerateError> {
        loop {
            let line = self
                .lines
                .next_line()
                .await
                .map_err(|source| EnumerateError::Read {
                    line: self.line_no + 1,
                    source,
                })?;
            let Some(line) = line else {
                return Ok(None);
            };
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Ok(Some(Item::new(trimmed)));
        }
    }
}
