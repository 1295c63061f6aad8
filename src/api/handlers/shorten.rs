//! Handler for the shorten endpoint.

use axum::{
    Json,
    extract::{Query, State},
};
use validator::Validate;

use crate::api::dto::url::{ShortenQuery, UrlResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns the short URL for a long URL, creating or renewing the mapping.
///
/// # Endpoint
///
/// `GET /shorten?url=<long_url>`
///
/// # Response
///
/// ```json
/// {
///   "long_url": "http://example.com",
///   "short_url": "url.shorten/a9b9f04336ce0181a08e774e01113b31",
///   "expiry_time": "2024-01-01T13:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 if `url` is missing or not an absolute HTTP(S) URL
/// - 409 if the short URL is held by a different long URL
/// - 500 on storage failure, 504 if a storage call times out
pub async fn shorten_handler(
    State(state): State<AppState>,
    Query(query): Query<ShortenQuery>,
) -> Result<Json<UrlResponse>, AppError> {
    query.validate()?;

    let record = state.url_service.shorten(&query.url).await?;

    Ok(Json(record.into()))
}
