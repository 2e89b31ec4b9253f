//! Per-id metadata payloads
//!
//! Payloads are opaque JSON objects. A missing entry is a normal state and
//! reads back as an empty object.

use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Opaque key-value payload attached to an id
pub type Metadata = Map<String, Value>;

/// Map from id to its latest metadata payload
#[derive(Debug, Default)]
pub struct MetadataTable {
    entries: RwLock<HashMap<String, Metadata>>,
}

impl MetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the payload for `id`
    pub fn put(&self, id: impl Into<String>, payload: Metadata) {
        self.entries.write().insert(id.into(), payload);
    }

    /// Overwrite many payloads under a single lock acquisition
    pub fn put_many<I>(&self, items: I)
    where
        I: IntoIterator<Item = (String, Metadata)>,
    {
        self.entries.write().extend(items);
    }

    /// Payload for `id`, or an empty payload if none was stored
    pub fn get(&self, id: &str) -> Metadata {
        self.entries.read().get(id).cloned().unwrap_or_default()
    }

    pub fn remove(&self, id: &str) {
        self.entries.write().remove(id);
    }

    /// Remove many ids under a single lock acquisition
    pub fn remove_many<'a, I>(&self, ids: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut entries = self.entries.write();
        for id in ids {
            entries.remove(id.as_str());
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
