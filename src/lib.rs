//! Spool library crate (used by the server and integration tests).
//!
//! A streaming response cache: the first request for a target fills an
//! append-only entry while it is being relayed, and later requests read the
//! same entry, even before it is complete.
//!
//! # Public API Surface
//!
//! ## Storage
//! - [`Storage`], [`EntryWriter`], [`EntryReader`] - Entry store contract
//! - [`MemoryStore`] - In-memory store with one writer and many cursors per entry
//!
//! ## Cache
//! - [`KeyCoordinator`], [`Lookup`] - Hit/populate decisions per key
//! - [`StreamCache`] - Single-flight coordinator over any [`Storage`]
//!
//! ## HTTP
//! - [`CacheLayer`], [`CacheService`] - Tower middleware
//! - [`gateway::create_router`] - Router used by the `spool` binary
//! - [`Config`], [`ConfigError`] - Server configuration
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod gateway;
pub mod middleware;
pub mod storage;

#[cfg(any(test, feature = "mock"))]
pub use cache::MockCoordinator;
pub use cache::{CacheError, CacheResult, KeyCoordinator, Lookup, StreamCache};
pub use config::{Config, ConfigError};
pub use middleware::{CacheLayer, CacheService, DEFAULT_CHUNK_SIZE, PopulateError, cache_key,
    is_cacheable,
};
pub use storage::{
    AccessTimes, EntryReader, EntryWriter, MemoryReader, MemoryStore, MemoryWriter, Storage,
    StorageError, StorageResult,
};
