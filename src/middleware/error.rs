use axum::BoxError;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
/// Reasons a population stopped before the handler's body ended.
pub enum PopulateError {
    /// The wrapped handler's response body yielded an error.
    #[error("response body failed: {0}")]
    Body(BoxError),

    /// The entry writer rejected an append.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
