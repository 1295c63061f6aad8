//! Input policy for long URLs.
//!
//! A long URL is accepted only if it is an absolute HTTP(S) URL that fits the
//! `urls.long_url` column. The input is checked, never rewritten: the exact
//! string the caller sent is what gets hashed and stored.

use url::Url;

/// Maximum accepted long URL length in bytes (`urls.long_url` is `VARCHAR(1024)`).
pub const MAX_URL_LEN: usize = 1024;

/// Reasons a long URL can be rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("URL is too long ({0} bytes, max {MAX_URL_LEN})")]
    TooLong(usize),

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must have a host")]
    MissingHost,
}

/// Checks that `input` is an acceptable long URL.
///
/// # Errors
///
/// - [`UrlValidationError::Empty`] for empty or whitespace-only input
/// - [`UrlValidationError::TooLong`] beyond [`MAX_URL_LEN`] bytes
/// - [`UrlValidationError::InvalidFormat`] when the `url` crate can't parse it
/// - [`UrlValidationError::UnsupportedProtocol`] for non-HTTP(S) schemes
/// - [`UrlValidationError::MissingHost`] when no host is present
pub fn validate_long_url(input: &str) -> Result<(), UrlValidationError> {
    if input.trim().is_empty() {
        return Err(UrlValidationError::Empty);
    }

    if input.len() > MAX_URL_LEN {
        return Err(UrlValidationError::TooLong(input.len()));
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(())
}
