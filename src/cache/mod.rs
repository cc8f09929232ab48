//! Key coordination over entry storage.
//!
//! [`KeyCoordinator`] is the contract the HTTP middleware consumes;
//! [`StreamCache`] is a minimal implementation over any [`Storage`](crate::storage::Storage).

pub mod coordinator;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod types;


pub use coordinator::{KeyCoordinator, StreamCache};
pub use error::{CacheError, CacheResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockCoordinator;
pub use types::Lookup;
