//! Key coordination: hit/miss decisions and single-flight population.

use tracing::{debug, info, instrument, warn};

use super::error::CacheResult;
use super::types::Lookup;
use crate::storage::{AccessTimes, EntryReader, EntryWriter, Storage, StorageError};

/// Decides, per key, whether a caller reads an existing entry or fills a new one.
///
/// At most one caller at a time receives [`Lookup::Populate`] for a key.
pub trait KeyCoordinator: Send + Sync {
    /// Cursor type handed to callers.
    type Reader: EntryReader + 'static;
    /// Writer type handed to the populating caller.
    type Writer: EntryWriter + 'static;

    /// Returns a cursor for `key`, plus a writer when the caller must populate it.
    fn get(&self, key: &str) -> CacheResult<Lookup<Self::Reader, Self::Writer>>;

    /// Gives up on a failed population of `key` so a later `get` populates it again.
    ///
    /// Handles already given out keep working.
    fn abandon(&self, _key: &str) {}
}

/// Minimal coordinator over any [`Storage`]. Entries live until removed.
pub struct StreamCache<S: Storage> {
    pub(super) storage: S,
}

impl<S: Storage> StreamCache<S> {
    /// Wraps `storage`, reloading any persisted entries first.
    pub fn new(storage: S) -> CacheResult<Self> {
        let mut restored = 0usize;
        storage.reload(&mut |_id, key| {
            debug!(key, "entry restored");
            restored += 1;
        })?;
        info!(restored, "stream cache ready");
        Ok(Self { storage })
    }

    /// Returns the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Drops `key` so the next request repopulates it.
    pub fn remove(&self, key: &str) -> CacheResult<()> {
        Ok(self.storage.remove(key)?)
    }

    /// Drops every key.
    pub fn clear(&self) -> CacheResult<()> {
        Ok(self.storage.remove_all()?)
    }

    /// Returns the entry's access times.
    pub fn access_times(&self, key: &str) -> CacheResult<AccessTimes> {
        Ok(self.storage.access_times(key)?)
    }
}

impl<S: Storage> KeyCoordinator for StreamCache<S> {
    type Reader = S::Reader;
    type Writer = S::Writer;

    #[instrument(skip(self), level = "debug")]
    fn get(&self, key: &str) -> CacheResult<Lookup<S::Reader, S::Writer>> {
        match self.storage.open(key) {
            Ok(reader) => return Ok(Lookup::Hit { reader }),
            Err(StorageError::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        match self.storage.create(key) {
            Ok(writer) => {
                let reader = self.storage.open(key)?;
                debug!("entry created for population");
                Ok(Lookup::Populate { reader, writer })
            }
            Err(StorageError::AlreadyExists { .. }) => {
                debug!("lost population race, reading existing entry");
                let reader = self.storage.open(key)?;
                Ok(Lookup::Hit { reader })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn abandon(&self, key: &str) {
        match self.storage.remove(key) {
            Ok(()) => debug!(key, "abandoned entry removed"),
            Err(e) => warn!(key, error = %e, "failed to remove abandoned entry"),
        }
    }
}

impl<S: Storage + std::fmt::Debug> std::fmt::Debug for StreamCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamCache")
            .field("storage", &self.storage)
            .finish()
    }
}
