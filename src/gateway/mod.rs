//! HTTP gateway (Axum) serving a directory through the response cache.
//!
//! This module is primarily used by the `spool` server binary.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{Json, Router, response::IntoResponse, routing::get};
use tower::Layer;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::cache::KeyCoordinator;
use crate::config::Config;
use crate::middleware::CacheLayer;

/// Builds the server router.
///
/// `/healthz` is answered directly; every other path is served from
/// `config.root_dir` with bodies cached through `coordinator`.
pub fn create_router<C>(config: &Config, coordinator: Arc<C>) -> Router
where
    C: KeyCoordinator + 'static,
{
    let files = CacheLayer::new(coordinator)
        .chunk_size(config.chunk_size)
        .layer(ServeDir::new(&config.root_dir));

    Router::new()
        .route("/healthz", get(health_handler))
        .fallback_service(files)
        .layer(TraceLayer::new_for_http())
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}
