//! Whole-request deadline middleware.

use std::time::Duration;

use axum::http::StatusCode;
use tower_http::timeout::TimeoutLayer;

/// Creates a layer that answers `408 Request Timeout` once a request has been
/// in flight for longer than `timeout`.
///
/// Bounds how long a slow client can hold a connection open while the request
/// is being read and handled.
pub fn layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}
