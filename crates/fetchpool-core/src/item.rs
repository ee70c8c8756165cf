//! Items to fetch and the payloads fetched for them.

use std::fmt;
use std::sync::Arc;

/// Identifier of one unit of remote content: a URL or a storage key.
///
/// Cheap to clone; the identifier itself never changes after enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item(Arc<str>);

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        let id: String = id.into();
        Self(Arc::from(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Item {
    fn from(id: &str) -> Self {
        Self(Arc::from(id))
    }
}

impl From<String> for Item {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Bytes fetched for one item.
///
/// Not `Clone`: a payload is owned by exactly one stage at a time and moves
/// on handoff.
#[derive(Debug, PartialEq, Eq)]
pub struct Payload {
    item: Item,
    body: Vec<u8>,
}

impl Payload {
    pub fn new(item: Item, body: Vec<u8>) -> Self {
        Self { item, body }
    }

    /// The item this payload was fetched for (also the destination hint).
    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn into_parts(self) -> (Item, Vec<u8>) {
        (self.item, self.body)
    }
}
