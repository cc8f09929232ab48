use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::BoxError;
use axum::body::{Body, Bytes, HttpBody};
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::oneshot;
use tower::Service;
use tracing::{Instrument, debug, error, warn};

use super::{cache_key, is_cacheable};
use super::populate::fill_entry;
use super::relay::relay_body;
use crate::cache::{KeyCoordinator, Lookup};
use crate::storage::EntryWriter;

/// Wraps a service so its response bodies are cached per request target.
///
/// Built by [`CacheLayer`](super::CacheLayer).
pub struct CacheService<S, C> {
    inner: S,
    coordinator: Arc<C>,
    chunk_size: usize,
}

impl<S, C> CacheService<S, C> {
    pub(crate) fn new(inner: S, coordinator: Arc<C>, chunk_size: usize) -> Self {
        Self {
            inner,
            coordinator,
            chunk_size,
        }
    }

    /// Returns the wrapped service.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S: Clone, C> Clone for CacheService<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            coordinator: Arc::clone(&self.coordinator),
            chunk_size: self.chunk_size,
        }
    }
}

impl<S, C, ReqBody, ResBody> Service<Request<ReqBody>> for CacheService<S, C>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    C: KeyCoordinator + 'static,
    ReqBody: Send + 'static,
    ResBody: HttpBody<Data = Bytes> + Send + 'static,
    ResBody::Error: Into<BoxError>,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response<Body>, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        // Keep the service that was polled ready; leave a fresh clone behind.
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);
        let coordinator = Arc::clone(&self.coordinator);
        let chunk_size = self.chunk_size;

        Box::pin(async move {
            let key = cache_key(&request);

            if !is_cacheable(&request) {
                debug!(key = %key, method = %request.method(), "request not cacheable, passing through");
                return call_direct(inner, request).await;
            }

            match coordinator.get(&key) {
                Ok(Lookup::Hit { reader }) => {
                    debug!(key = %key, "cache hit");
                    Ok(Response::new(relay_body(reader, chunk_size)))
                }
                Ok(Lookup::Populate { reader, writer }) => {
                    debug!(key = %key, "cache miss, populating");
                    let head =
                        spawn_population(inner, request, writer, Arc::clone(&coordinator));

                    match head.await {
                        Ok(Ok(parts)) => {
                            Ok(Response::from_parts(parts, relay_body(reader, chunk_size)))
                        }
                        Ok(Err(e)) => Err(e),
                        Err(_) => {
                            error!(key = %key, "population task ended without a response");
                            Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response())
                        }
                    }
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "cache unavailable, bypassing");
                    call_direct(inner, request).await
                }
            }
        })
    }
}

async fn call_direct<S, ReqBody, ResBody>(
    mut inner: S,
    request: Request<ReqBody>,
) -> Result<Response<Body>, S::Error>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    ResBody: HttpBody<Data = Bytes> + Send + 'static,
    ResBody::Error: Into<BoxError>,
{
    let response = inner.call(request).await?;
    Ok(response.map(Body::new))
}

type HeadResult<E> = Result<axum::http::response::Parts, E>;

/// Runs the wrapped service in its own task, feeding the body into `writer`.
///
/// The response head comes back through the returned channel; the task is
/// never joined. The writer is closed when the body ends. On any failure,
/// panics included, the key is abandoned and the writer aborted.
fn spawn_population<S, C, ReqBody, ResBody>(
    inner: S,
    request: Request<ReqBody>,
    mut writer: C::Writer,
    coordinator: Arc<C>,
) -> oneshot::Receiver<HeadResult<S::Error>>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    C: KeyCoordinator + 'static,
    ReqBody: Send + 'static,
    ResBody: HttpBody<Data = Bytes> + Send + 'static,
    ResBody::Error: Into<BoxError>,
{
    let (head_tx, head_rx) = oneshot::channel();

    tokio::spawn(
        async move {
            let key = writer.name().to_string();
            let mut abandoned = false;

            let filled = AssertUnwindSafe(drive_population(
                inner,
                request,
                &mut writer,
                &*coordinator,
                &mut abandoned,
                head_tx,
            ))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                error!(key = %key, "population panicked");
                false
            });

            if filled {
                writer.close();
            } else {
                if !abandoned {
                    coordinator.abandon(&key);
                }
                writer.abort();
            }
        }
        .in_current_span(),
    );

    head_rx
}

/// Drives one population. Returns `true` if the handler's whole body was written.
///
/// A response other than `200 OK` is still relayed to the caller, but its key
/// is abandoned as soon as the head arrives. A service error abandons the key
/// before the error is handed back. `abandoned` records either case.
async fn drive_population<S, C, ReqBody, ResBody>(
    mut inner: S,
    request: Request<ReqBody>,
    writer: &mut C::Writer,
    coordinator: &C,
    abandoned: &mut bool,
    head_tx: oneshot::Sender<HeadResult<S::Error>>,
) -> bool
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    C: KeyCoordinator,
    ResBody: HttpBody<Data = Bytes>,
    ResBody::Error: Into<BoxError>,
{
    let key = writer.name().to_string();

    let response = match inner.call(request).await {
        Ok(response) => response,
        Err(e) => {
            debug!(key = %key, "wrapped service failed, abandoning entry");
            coordinator.abandon(&key);
            *abandoned = true;
            let _ = head_tx.send(Err(e));
            return false;
        }
    };

    let (parts, body) = response.into_parts();
    if parts.status != StatusCode::OK {
        debug!(key = %key, status = %parts.status, "response not cacheable, abandoning entry");
        coordinator.abandon(&key);
        *abandoned = true;
    }
    if head_tx.send(Ok(parts)).is_err() {
        debug!(key = %key, "caller left before the response head, populating anyway");
    }

    match fill_entry(body, writer).await {
        Ok(bytes) => {
            debug!(key = %key, bytes, "population complete");
            true
        }
        Err(e) => {
            warn!(key = %key, error = %e, "population failed");
            false
        }
    }
}
