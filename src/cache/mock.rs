use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::coordinator::{KeyCoordinator, StreamCache};
use super::error::{CacheError, CacheResult};
use super::types::Lookup;
use crate::storage::{MemoryReader, MemoryStore, MemoryWriter};

/// [`StreamCache`] over a [`MemoryStore`] that can be switched to fail every lookup.
///
/// Lookups that are not switched off go to a real store, so tests can inspect
/// entries through [`store`](Self::store).
pub struct MockCoordinator {
    inner: StreamCache<MemoryStore>,
    unavailable: AtomicBool,
    gets: AtomicUsize,
}

impl MockCoordinator {
    /// Creates an available coordinator over an empty store.
    pub fn new() -> Self {
        Self {
            inner: StreamCache {
                storage: MemoryStore::new(),
            },
            unavailable: AtomicBool::new(false),
            gets: AtomicUsize::new(0),
        }
    }

    /// Coordinator whose every `get` fails with [`CacheError::Unavailable`].
    pub fn unavailable() -> Self {
        let mock = Self::new();
        mock.set_unavailable(true);
        mock
    }

    /// Switches every subsequent `get` to fail (`true`) or succeed (`false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `get` calls seen, including failed ones.
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// The store behind the coordinator.
    pub fn store(&self) -> &MemoryStore {
        self.inner.storage()
    }
}

impl Default for MockCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyCoordinator for MockCoordinator {
    type Reader = MemoryReader;
    type Writer = MemoryWriter;

    fn get(&self, key: &str) -> CacheResult<Lookup<MemoryReader, MemoryWriter>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("mock coordinator disabled".to_string()));
        }
        self.inner.get(key)
    }

    fn abandon(&self, key: &str) {
        self.inner.abandon(key);
    }
}
