//! Repository trait for URL record data access.

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for URL records.
///
/// Records are never deleted. The only mutation after insert is [`renew`],
/// which re-arms an expired mapping in place.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryUrlRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_url.rs`
///
/// [`renew`]: UrlRepository::renew
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Finds the most recent record for a long URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Finds a record by its short URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn find_by_short_url(&self, short_url: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Inserts a new record. `created_at` and `updated_at` are set by the store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short URL already exists.
    /// Returns [`AppError::Storage`] on database errors.
    async fn insert(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError>;

    /// Atomically re-arms an expired record.
    ///
    /// Sets `expiry_time` and bumps `updated_at` on the row with `short_url`,
    /// but only if it belongs to `long_url` and its current expiry is strictly
    /// before `now`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(UrlRecord))` with the renewed row
    /// - `Ok(None)` if no row matched the conditions
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn renew(
        &self,
        short_url: &str,
        long_url: &str,
        expiry_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<UrlRecord>, AppError>;

    /// Returns true if the store is reachable.
    async fn health_check(&self) -> bool;
}
