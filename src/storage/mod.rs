//! Storage primitives: the entry store contract and its in-memory implementation.
//!
//! An entry is a named, append-only byte sequence with exactly one writer and
//! any number of independent cursors. Handles keep their entry alive after it
//! leaves the index.

pub mod error;
pub mod memory;
mod types;

pub use error::{StorageError, StorageResult};
pub use memory::{MemoryReader, MemoryStore, MemoryWriter};
pub use types::{AccessTimes, EntryReader, EntryWriter};

/// Named, append-only entry store.
pub trait Storage: Send + Sync {
    /// Append handle type.
    type Writer: EntryWriter + 'static;
    /// Cursor type.
    type Reader: EntryReader + 'static;

    /// Creates and publishes a new entry and returns its only writer.
    ///
    /// Fails with [`StorageError::AlreadyExists`] while `key` has an entry. Once
    /// this returns, `open(key)` from any caller succeeds.
    fn create(&self, key: &str) -> StorageResult<Self::Writer>;

    /// Opens a new cursor at offset zero and records the read time.
    ///
    /// Fails with [`StorageError::NotFound`] if `key` has no entry.
    fn open(&self, key: &str) -> StorageResult<Self::Reader>;

    /// Drops `key` from the index. Missing keys are not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Drops every key from the index at once. Outstanding handles stay usable.
    fn remove_all(&self) -> StorageResult<()>;

    /// Re-populates the index from persistent state, calling `visit(internal_id, key)`
    /// for each entry found. Non-persistent stores do nothing.
    fn reload(&self, visit: &mut dyn FnMut(&str, &str)) -> StorageResult<()>;

    /// Returns the entry's last-read and write-start times.
    ///
    /// Fails with [`StorageError::NotFound`] if `key` has no entry.
    fn access_times(&self, key: &str) -> StorageResult<AccessTimes>;
}
