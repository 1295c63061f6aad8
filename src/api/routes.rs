//! API route configuration.

use crate::api::handlers::{shorten_handler, unshorten_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// URL mapping routes.
///
/// # Endpoints
///
/// - `GET /shorten?url=<long_url>`    - Create or reuse a short URL
/// - `GET /unshorten?url=<short_url>` - Resolve a short URL
pub fn url_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", get(shorten_handler))
        .route("/unshorten", get(unshorten_handler))
}
