//! Tower middleware that caches response bodies by request target.
//!
//! Per request the middleware asks a [`KeyCoordinator`] for the entry keyed by
//! the request URI:
//!
//! - **Hit**: the entry is relayed to the caller with `200 OK`.
//! - **Miss**: the wrapped service runs in a spawned task whose body frames are
//!   appended to the entry, while the caller receives the service's own status
//!   and headers followed by a live relay of the entry.
//! - **Coordinator error**: the wrapped service is called directly (bypass).
//!
//! Requests other than plain `GET`s (see [`is_cacheable`]) skip the cache. A
//! population whose response is not `200 OK`, or whose handler fails, is
//! abandoned so the entry is never served as a hit.
//!
//! Only body bytes are cached. Method, headers and request body are not part
//! of the key, so the layer suits idempotent `GET`-style routes only.
//!
//! ```text
//!  caller ◄── relay(reader) ◄── entry ◄── fill(writer) ◄── inner service
//!                                  ▲            (spawned task)
//!                     KeyCoordinator::get(uri)
//! ```

pub mod error;
mod populate;
mod relay;
mod service;


pub use error::PopulateError;
pub use service::CacheService;

use std::sync::Arc;

use axum::http::{HeaderName, Method, Request, header};
use tower::Layer;

use crate::cache::KeyCoordinator;

/// Default size of each relayed body chunk, in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Cache key for `request`: its full request target.
pub fn cache_key<B>(request: &Request<B>) -> String {
    request.uri().to_string()
}

/// Headers that ask for a partial or conditional body.
const VARIANT_HEADERS: [HeaderName; 6] = [
    header::RANGE,
    header::IF_RANGE,
    header::IF_MATCH,
    header::IF_NONE_MATCH,
    header::IF_MODIFIED_SINCE,
    header::IF_UNMODIFIED_SINCE,
];

/// Returns `true` if `request` may read or fill a cache entry.
///
/// Only plain `GET`s qualify. Other requests are passed to the wrapped
/// service untouched.
pub fn is_cacheable<B>(request: &Request<B>) -> bool {
    request.method() == Method::GET
        && !VARIANT_HEADERS
            .iter()
            .any(|name| request.headers().contains_key(name))
}

/// [`Layer`] producing [`CacheService`]s that share one coordinator.
pub struct CacheLayer<C> {
    coordinator: Arc<C>,
    chunk_size: usize,
}

impl<C: KeyCoordinator> CacheLayer<C> {
    /// Creates a layer backed by `coordinator`.
    pub fn new(coordinator: Arc<C>) -> Self {
        Self {
            coordinator,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Sets the relay chunk size (values below 1 are raised to 1).
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Returns the shared coordinator.
    pub fn coordinator(&self) -> &Arc<C> {
        &self.coordinator
    }
}

impl<C> Clone for CacheLayer<C> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Arc::clone(&self.coordinator),
            chunk_size: self.chunk_size,
        }
    }
}

impl<S, C> Layer<S> for CacheLayer<C> {
    type Service = CacheService<S, C>;

    fn layer(&self, inner: S) -> Self::Service {
        CacheService::new(inner, Arc::clone(&self.coordinator), self.chunk_size)
    }
}

impl<C> std::fmt::Debug for CacheLayer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheLayer")
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}
