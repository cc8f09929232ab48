use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Errors returned by [`Storage`](super::Storage) implementations and entry handles.
pub enum StorageError {
    /// `create` was called for a key that already has an entry.
    #[error("entry already exists: {key}")]
    AlreadyExists {
        /// Key that was already present.
        key: String,
    },

    /// No entry exists for the key.
    #[error("entry not found: {key}")]
    NotFound {
        /// Key that was looked up.
        key: String,
    },

    /// Append attempted after the writer was closed.
    #[error("writer closed: {key}")]
    WriterClosed {
        /// Key of the entry the writer was bound to.
        key: String,
    },

    /// The writer gave up before the entry held a complete body.
    #[error("entry aborted: {key}")]
    Aborted {
        /// Key of the aborted entry.
        key: String,
    },
}

impl StorageError {
    /// Returns `true` for [`StorageError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    /// Returns `true` for [`StorageError::AlreadyExists`].
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StorageError::AlreadyExists { .. })
    }
}

/// Convenience result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
