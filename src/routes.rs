//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET /shorten`   - Create or reuse a short URL
//! - `GET /unshorten` - Resolve a short URL
//! - `GET /health`    - Health check
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Timeout** - Whole-request deadline (`408` when exceeded)
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{timeout, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use std::time::Duration;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the router with all routes and the tracing layer.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::routes::url_routes())
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application service served by the HTTP listener.
///
/// Wraps [`build_router`] with the request deadline and so that `/shorten/`
/// and `/shorten` hit the same handler.
pub fn app_router(state: AppState, request_timeout: Duration) -> NormalizePath<Router> {
    let router = build_router(state).layer(timeout::layer(request_timeout));
    NormalizePathLayer::trim_trailing_slash().layer(router)
}
