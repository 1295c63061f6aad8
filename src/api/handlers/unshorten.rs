//! Handler for the unshorten endpoint.

use axum::{
    Json,
    extract::{Query, State},
};
use validator::Validate;

use crate::api::dto::url::{UnshortenQuery, UrlResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Resolves a short URL back to its long URL.
///
/// # Endpoint
///
/// `GET /unshorten?url=<short_url>`
///
/// # Errors
///
/// - 400 if `url` is missing
/// - 404 if the short URL is unknown
/// - 410 if the mapping has expired
/// - 500 on storage failure, 504 if a storage call times out
pub async fn unshorten_handler(
    State(state): State<AppState>,
    Query(query): Query<UnshortenQuery>,
) -> Result<Json<UrlResponse>, AppError> {
    query.validate()?;

    let record = state.url_service.unshorten(&query.url).await?;

    Ok(Json(record.into()))
}
