//! DTOs for the shorten and unshorten endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::UrlRecord;

/// Query string of `GET /shorten`.
///
/// A missing `url` parameter deserializes to an empty string and fails
/// validation, so clients get a JSON 400 rather than a bare rejection.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenQuery {
    #[serde(default)]
    #[validate(length(min = 1, max = 1024, message = "url must be 1 to 1024 bytes"))]
    pub url: String,
}

/// Query string of `GET /unshorten`.
#[derive(Debug, Deserialize, Validate)]
pub struct UnshortenQuery {
    #[serde(default)]
    #[validate(length(min = 1, max = 256, message = "url must be 1 to 256 bytes"))]
    pub url: String,
}

/// Response body of both endpoints.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UrlResponse {
    pub long_url: String,
    pub short_url: String,
    pub expiry_time: DateTime<Utc>,
}

impl From<UrlRecord> for UrlResponse {
    fn from(record: UrlRecord) -> Self {
        Self {
            long_url: record.long_url,
            short_url: record.short_url,
            expiry_time: record.expiry_time,
        }
    }
}
