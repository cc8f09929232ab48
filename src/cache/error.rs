use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
/// Errors returned by a [`KeyCoordinator`](super::KeyCoordinator).
///
/// Callers in the request path treat every variant as "cache unavailable".
pub enum CacheError {
    /// The coordinator cannot serve lookups right now.
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    /// The underlying storage rejected an operation.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Convenience result type for coordinator operations.
pub type CacheResult<T> = Result<T, CacheError>;
