//! In-memory entry store.
//!
//! The index is a sharded concurrent map, so `create`/`open`/`remove` from
//! many tasks need no outside locking. The surrounding `RwLock` is only ever
//! taken exclusively by [`MemoryStore::remove_all`], which swaps the whole
//! index out in one step.

mod entry;


pub use entry::{MemoryReader, MemoryWriter};

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use tracing::debug;

use self::entry::MemoryEntry;
use super::Storage;
use super::error::{StorageError, StorageResult};
use super::types::AccessTimes;

/// Non-persistent [`Storage`] keeping every entry in process memory.
///
/// `reload` is a no-op.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<DashMap<String, Arc<MemoryEntry>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently indexed.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no keys are indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns `true` if `key` currently has an entry.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Snapshot of the indexed keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .iter()
            .map(|item| item.key().clone())
            .collect();
        keys.sort();
        keys
    }

    fn entry(&self, key: &str) -> StorageResult<Arc<MemoryEntry>> {
        self.entries
            .read()
            .get(key)
            .map(|item| Arc::clone(item.value()))
            .ok_or_else(|| StorageError::NotFound {
                key: key.to_string(),
            })
    }
}

impl Storage for MemoryStore {
    type Writer = MemoryWriter;
    type Reader = MemoryReader;

    fn create(&self, key: &str) -> StorageResult<MemoryWriter> {
        let index = self.entries.read();
        match index.entry(key.to_string()) {
            Entry::Occupied(_) => Err(StorageError::AlreadyExists {
                key: key.to_string(),
            }),
            Entry::Vacant(slot) => {
                let entry = Arc::new(MemoryEntry::new(key));
                slot.insert(Arc::clone(&entry));
                debug!(key, "entry created");
                Ok(MemoryWriter::new(entry))
            }
        }
    }

    fn open(&self, key: &str) -> StorageResult<MemoryReader> {
        let entry = self.entry(key)?;
        entry.touch();
        Ok(MemoryReader::new(entry))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        if self.entries.read().remove(key).is_some() {
            debug!(key, "entry removed");
        }
        Ok(())
    }

    fn remove_all(&self) -> StorageResult<()> {
        let discarded = std::mem::take(&mut *self.entries.write());
        debug!(entries = discarded.len(), "store cleared");
        Ok(())
    }

    fn reload(&self, _visit: &mut dyn FnMut(&str, &str)) -> StorageResult<()> {
        Ok(())
    }

    fn access_times(&self, key: &str) -> StorageResult<AccessTimes> {
        Ok(self.entry(key)?.access_times())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.len())
            .finish()
    }
}
