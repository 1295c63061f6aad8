//! Shorten/unshorten resolver.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::utils::hasher::digest;
use crate::utils::url_validator::validate_long_url;

/// Prefix prepended to every digest to form the short URL.
pub const DEFAULT_DOMAIN_PREFIX: &str = "url.shorten/";

/// How long a mapping stays valid after creation or renewal.
pub const DEFAULT_EXPIRY_MINUTES: i64 = 60;

/// Deadline applied to every individual storage call.
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Tunables for [`UrlService`].
#[derive(Debug, Clone)]
pub struct ShortenerSettings {
    pub domain_prefix: String,
    pub expiry_window: chrono::Duration,
    pub storage_timeout: Duration,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self {
            domain_prefix: DEFAULT_DOMAIN_PREFIX.to_string(),
            expiry_window: chrono::Duration::minutes(DEFAULT_EXPIRY_MINUTES),
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
        }
    }
}

/// Service that maps long URLs to deterministic short URLs and back.
///
/// The short URL is `domain_prefix + md5hex(long_url)`. Because it is derived
/// from the long URL, there is exactly one row per long URL; once that row
/// expires, the next [`shorten`](Self::shorten) renews it in place instead of
/// inserting a duplicate.
///
/// # Concurrency
///
/// Find-then-insert is not locked. Concurrent first-time calls race on the
/// unique `short_url` constraint; the loser re-reads and adopts the winner's
/// row, so both callers see the same record.
pub struct UrlService<R: UrlRepository + ?Sized> {
    repository: Arc<R>,
    settings: ShortenerSettings,
}

impl<R: UrlRepository + ?Sized> UrlService<R> {
    /// Creates a new resolver over the given store.
    pub fn new(repository: Arc<R>, settings: ShortenerSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    pub fn settings(&self) -> &ShortenerSettings {
        &self.settings
    }

    /// Builds the short URL for a long URL.
    pub fn short_url_for(&self, long_url: &str) -> String {
        format!("{}{}", self.settings.domain_prefix, digest(long_url))
    }

    /// Returns the active mapping for `long_url`, creating or renewing it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL fails the input policy.
    /// Returns [`AppError::Conflict`] if the short URL is held by a different
    /// long URL, or the row changed under us and could not be adopted.
    /// Returns [`AppError::Timeout`] if a storage call exceeds the deadline.
    /// Returns [`AppError::Storage`] on database errors.
    pub async fn shorten(&self, long_url: &str) -> Result<UrlRecord, AppError> {
        validate_long_url(long_url).map_err(|e| {
            AppError::bad_request(
                "Invalid URL",
                json!({ "url": long_url, "reason": e.to_string() }),
            )
        })?;

        let short_url = self.short_url_for(long_url);
        let now = Utc::now();

        let existing = self
            .with_deadline("find_by_long_url", self.repository.find_by_long_url(long_url))
            .await?;

        match existing {
            Some(record) if !record.is_expired_at(now) => {
                debug!(short_url = %record.short_url, "Reusing active mapping");
                Ok(record)
            }
            Some(record) if record.short_url == short_url => {
                debug!(short_url = %short_url, "Renewing expired mapping");
                self.renew_or_adopt(long_url, &short_url, now).await
            }
            // The prefix changed since this row was written; it keeps its old
            // short URL and a new one is created next to it.
            Some(_) | None => self.create(long_url, &short_url, now).await,
        }
    }

    /// Resolves a short URL to its record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has this short URL.
    /// Returns [`AppError::Expired`] if the record expired before now.
    /// Returns [`AppError::Timeout`] if the storage call exceeds the deadline.
    /// Returns [`AppError::Storage`] on database errors.
    pub async fn unshorten(&self, short_url: &str) -> Result<UrlRecord, AppError> {
        let record = self
            .with_deadline(
                "find_by_short_url",
                self.repository.find_by_short_url(short_url),
            )
            .await?
            .ok_or_else(|| {
                AppError::not_found("Short URL not found", json!({ "short_url": short_url }))
            })?;

        if record.is_expired_at(Utc::now()) {
            return Err(AppError::expired(
                "Short URL already expired",
                json!({ "short_url": short_url, "expiry_time": record.expiry_time }),
            ));
        }

        Ok(record)
    }

    /// Returns true if the underlying store answers its health probe in time.
    pub async fn storage_healthy(&self) -> bool {
        tokio::time::timeout(self.settings.storage_timeout, self.repository.health_check())
            .await
            .unwrap_or(false)
    }

    async fn create(
        &self,
        long_url: &str,
        short_url: &str,
        now: DateTime<Utc>,
    ) -> Result<UrlRecord, AppError> {
        let new_record = NewUrlRecord {
            long_url: long_url.to_string(),
            short_url: short_url.to_string(),
            expiry_time: self.expiry_from(now)?,
        };

        match self
            .with_deadline("insert", self.repository.insert(new_record))
            .await
        {
            Ok(record) => {
                debug!(short_url = %record.short_url, "Created mapping");
                Ok(record)
            }
            Err(e) if e.is_conflict() => {
                warn!(short_url = %short_url, "Insert lost a race, adopting existing row");
                self.adopt(long_url, short_url).await
            }
            Err(e) => Err(e),
        }
    }

    async fn renew_or_adopt(
        &self,
        long_url: &str,
        short_url: &str,
        now: DateTime<Utc>,
    ) -> Result<UrlRecord, AppError> {
        let expiry_time = self.expiry_from(now)?;
        let renewed = self
            .with_deadline(
                "renew",
                self.repository.renew(short_url, long_url, expiry_time, now),
            )
            .await?;

        match renewed {
            Some(record) => Ok(record),
            None => {
                warn!(short_url = %short_url, "Renewal matched no row, adopting existing row");
                self.adopt(long_url, short_url).await
            }
        }
    }

    /// Re-reads the row holding `short_url` after a lost race.
    async fn adopt(&self, long_url: &str, short_url: &str) -> Result<UrlRecord, AppError> {
        let now = Utc::now();
        let current = self
            .with_deadline(
                "find_by_short_url",
                self.repository.find_by_short_url(short_url),
            )
            .await?;

        match current {
            Some(record) if record.long_url != long_url => Err(AppError::conflict(
                "Short URL is already assigned to a different URL",
                json!({ "short_url": short_url }),
            )),
            Some(record) if !record.is_expired_at(now) => Ok(record),
            Some(_) => self
                .with_deadline(
                    "renew",
                    self.repository
                        .renew(short_url, long_url, self.expiry_from(now)?, now),
                )
                .await?
                .ok_or_else(|| {
                    AppError::conflict(
                        "Mapping was modified concurrently",
                        json!({ "short_url": short_url }),
                    )
                }),
            None => Err(AppError::conflict(
                "Mapping was modified concurrently",
                json!({ "short_url": short_url }),
            )),
        }
    }

    /// Expiry time of a mapping created or renewed at `now`.
    fn expiry_from(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, AppError> {
        now.checked_add_signed(self.settings.expiry_window)
            .ok_or_else(|| {
                AppError::storage(
                    "Expiry time out of range",
                    json!({ "expiry_window_secs": self.settings.expiry_window.num_seconds() }),
                )
            })
    }

    async fn with_deadline<T, F>(&self, operation: &'static str, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        let limit = self.settings.storage_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(AppError::timeout(
                "Storage call timed out",
                json!({ "operation": operation, "timeout_ms": limit.as_millis() as u64 }),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlRepository;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;

    const LONG_URL: &str = "http://example.com";

    fn record(long_url: &str, short_url: &str, expiry_time: DateTime<Utc>) -> UrlRecord {
        let created = Utc::now() - ChronoDuration::hours(2);
        UrlRecord {
            id: 7,
            long_url: long_url.to_string(),
            short_url: short_url.to_string(),
            expiry_time,
            created_at: created,
            updated_at: created,
        }
    }

    fn expected_short_url(long_url: &str) -> String {
        format!("url.shorten/{}", digest(long_url))
    }

    fn service(repo: MockUrlRepository) -> UrlService<MockUrlRepository> {
        UrlService::new(Arc::new(repo), ShortenerSettings::default())
    }

    #[tokio::test]
    async fn test_shorten_with_unrepresentable_expiry_fails_without_insert() {
        let mut repo = MockUrlRepository::new();

        repo.expect_find_by_long_url().returning(|_| Ok(None));
        repo.expect_insert().never();

        let settings = ShortenerSettings {
            expiry_window: chrono::TimeDelta::MAX,
            ..ShortenerSettings::default()
        };
        let svc = UrlService::new(Arc::new(repo), settings);

        let err = svc.shorten(LONG_URL).await.unwrap_err();
        assert!(matches!(err, AppError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_renew_with_unrepresentable_expiry_fails_without_update() {
        let mut repo = MockUrlRepository::new();
        let short_url = expected_short_url(LONG_URL);
        let stale = record(LONG_URL, &short_url, Utc::now() - ChronoDuration::minutes(1));

        repo.expect_find_by_long_url()
            .returning(move |_| Ok(Some(stale.clone())));
        repo.expect_renew().never();

        let settings = ShortenerSettings {
            expiry_window: chrono::TimeDelta::MAX,
            ..ShortenerSettings::default()
        };
        let svc = UrlService::new(Arc::new(repo), settings);

        let err = svc.shorten(LONG_URL).await.unwrap_err();
        assert!(matches!(err, AppError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_shorten_creates_new_mapping() {
        let mut repo = MockUrlRepository::new();

        repo.expect_find_by_long_url()
            .withf(|url| url == LONG_URL)
            .times(1)
            .returning(|_| Ok(None));

        repo.expect_insert()
            .withf(|new_record| {
                let window = new_record.expiry_time - Utc::now();
                new_record.long_url == LONG_URL
                    && new_record.short_url == expected_short_url(LONG_URL)
                    && window > ChronoDuration::minutes(59)
                    && window <= ChronoDuration::minutes(60)
            })
            .times(1)
            .returning(|new_record| {
                let now = Utc::now();
                Ok(UrlRecord {
                    id: 1,
                    long_url: new_record.long_url,
                    short_url: new_record.short_url,
                    expiry_time: new_record.expiry_time,
                    created_at: now,
                    updated_at: now,
                })
            });

        let result = service(repo).shorten(LONG_URL).await.unwrap();

        assert_eq!(result.long_url, LONG_URL);
        assert_eq!(
            result.short_url,
            "url.shorten/a9b9f04336ce0181a08e774e01113b31"
        );
    }

    #[tokio::test]
    async fn test_shorten_reuses_active_mapping() {
        let mut repo = MockUrlRepository::new();

        let existing = record(
            LONG_URL,
            &expected_short_url(LONG_URL),
            Utc::now() + ChronoDuration::minutes(30),
        );
        let returned = existing.clone();
        repo.expect_find_by_long_url()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));
        repo.expect_insert().times(0);
        repo.expect_renew().times(0);

        let result = service(repo).shorten(LONG_URL).await.unwrap();

        assert_eq!(result, existing);
    }

    #[tokio::test]
    async fn test_shorten_renews_expired_mapping() {
        let mut repo = MockUrlRepository::new();
        let short_url = expected_short_url(LONG_URL);

        let expired = record(LONG_URL, &short_url, Utc::now() - ChronoDuration::minutes(1));
        let created_at = expired.created_at;
        repo.expect_find_by_long_url()
            .times(1)
            .returning(move |_| Ok(Some(expired.clone())));
        repo.expect_insert().times(0);

        let expected = short_url.clone();
        repo.expect_renew()
            .withf(move |short, long, expiry, now| {
                short == expected && long == LONG_URL && *expiry > *now
            })
            .times(1)
            .returning(move |short, long, expiry, now| {
                Ok(Some(UrlRecord {
                    id: 7,
                    long_url: long.to_string(),
                    short_url: short.to_string(),
                    expiry_time: expiry,
                    created_at,
                    updated_at: now,
                }))
            });

        let result = service(repo).shorten(LONG_URL).await.unwrap();

        assert_eq!(result.short_url, short_url);
        assert_eq!(result.created_at, created_at);
        assert!(!result.is_expired());
    }

    #[tokio::test]
    async fn test_shorten_adopts_after_concurrent_renewal() {
        let mut repo = MockUrlRepository::new();
        let short_url = expected_short_url(LONG_URL);

        let expired = record(LONG_URL, &short_url, Utc::now() - ChronoDuration::minutes(1));
        repo.expect_find_by_long_url()
            .times(1)
            .returning(move |_| Ok(Some(expired.clone())));
        repo.expect_renew().times(1).returning(|_, _, _, _| Ok(None));

        let fresh = record(LONG_URL, &short_url, Utc::now() + ChronoDuration::minutes(60));
        let returned = fresh.clone();
        repo.expect_find_by_short_url()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));

        let result = service(repo).shorten(LONG_URL).await.unwrap();

        assert_eq!(result, fresh);
    }

    #[tokio::test]
    async fn test_shorten_adopts_winner_on_insert_conflict() {
        let mut repo = MockUrlRepository::new();
        let short_url = expected_short_url(LONG_URL);

        repo.expect_find_by_long_url()
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(AppError::conflict("Short URL already exists", json!({}))));

        let winner = record(LONG_URL, &short_url, Utc::now() + ChronoDuration::minutes(60));
        let returned = winner.clone();
        repo.expect_find_by_short_url()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));

        let result = service(repo).shorten(LONG_URL).await.unwrap();

        assert_eq!(result, winner);
    }

    #[tokio::test]
    async fn test_shorten_conflict_with_different_url() {
        let mut repo = MockUrlRepository::new();
        let short_url = expected_short_url(LONG_URL);

        repo.expect_find_by_long_url()
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(AppError::conflict("Short URL already exists", json!({}))));

        let squatter = record(
            "http://other.example",
            &short_url,
            Utc::now() + ChronoDuration::minutes(60),
        );
        repo.expect_find_by_short_url()
            .times(1)
            .returning(move |_| Ok(Some(squatter.clone())));

        let result = service(repo).shorten(LONG_URL).await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_shorten_rejects_invalid_url() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_long_url().times(0);
        repo.expect_insert().times(0);

        let svc = service(repo);

        for input in ["", "not-a-url", "ftp://example.com"] {
            let result = svc.shorten(input).await;
            assert!(
                matches!(result, Err(AppError::Validation { .. })),
                "{input:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_shorten_propagates_storage_error() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_long_url()
            .times(1)
            .returning(|_| Err(AppError::storage("Database error", json!({}))));
        repo.expect_insert().times(0);

        let result = service(repo).shorten(LONG_URL).await;

        assert!(matches!(result, Err(AppError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_shorten_uses_configured_prefix() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_long_url().returning(|_| Ok(None));
        repo.expect_insert()
            .withf(|new_record| new_record.short_url.starts_with("https://s.test/"))
            .times(1)
            .returning(|new_record| {
                let now = Utc::now();
                Ok(UrlRecord {
                    id: 1,
                    long_url: new_record.long_url,
                    short_url: new_record.short_url,
                    expiry_time: new_record.expiry_time,
                    created_at: now,
                    updated_at: now,
                })
            });

        let settings = ShortenerSettings {
            domain_prefix: "https://s.test/".to_string(),
            ..ShortenerSettings::default()
        };
        let svc = UrlService::new(Arc::new(repo), settings);

        let result = svc.shorten(LONG_URL).await.unwrap();
        assert_eq!(result.short_url, format!("https://s.test/{}", digest(LONG_URL)));
    }

    #[tokio::test]
    async fn test_unshorten_success() {
        let mut repo = MockUrlRepository::new();
        let short_url = expected_short_url(LONG_URL);

        let active = record(LONG_URL, &short_url, Utc::now() + ChronoDuration::minutes(10));
        let returned = active.clone();
        repo.expect_find_by_short_url()
            .withf(move |s| s == expected_short_url(LONG_URL))
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));

        let result = service(repo).unshorten(&short_url).await.unwrap();

        assert_eq!(result.long_url, LONG_URL);
    }

    #[tokio::test]
    async fn test_unshorten_not_found() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_short_url()
            .times(1)
            .returning(|_| Ok(None));

        let result = service(repo).unshorten("url.shorten/doesnotexist").await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_unshorten_expired() {
        let mut repo = MockUrlRepository::new();
        let short_url = expected_short_url(LONG_URL);

        let expired = record(LONG_URL, &short_url, Utc::now() - ChronoDuration::seconds(1));
        repo.expect_find_by_short_url()
            .times(1)
            .returning(move |_| Ok(Some(expired.clone())));

        let result = service(repo).unshorten(&short_url).await;

        assert!(matches!(result, Err(AppError::Expired { .. })));
    }

    /// Store whose every call outlives any reasonable deadline.
    struct SlowRepository;

    #[async_trait]
    impl UrlRepository for SlowRepository {
        async fn find_by_long_url(&self, _: &str) -> Result<Option<UrlRecord>, AppError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }

        async fn find_by_short_url(&self, _: &str) -> Result<Option<UrlRecord>, AppError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }

        async fn insert(&self, _: NewUrlRecord) -> Result<UrlRecord, AppError> {
            unreachable!("insert is never reached after a timed-out lookup")
        }

        async fn renew(
            &self,
            _: &str,
            _: &str,
            _: DateTime<Utc>,
            _: DateTime<Utc>,
        ) -> Result<Option<UrlRecord>, AppError> {
            unreachable!("renew is never reached after a timed-out lookup")
        }

        async fn health_check(&self) -> bool {
            tokio::time::sleep(Duration::from_secs(5)).await;
            true
        }
    }

    fn slow_service() -> UrlService<SlowRepository> {
        let settings = ShortenerSettings {
            storage_timeout: Duration::from_millis(20),
            ..ShortenerSettings::default()
        };
        UrlService::new(Arc::new(SlowRepository), settings)
    }

    #[tokio::test]
    async fn test_storage_deadline_yields_timeout() {
        let svc = slow_service();

        let shorten = svc.shorten(LONG_URL).await;
        assert!(matches!(shorten, Err(AppError::Timeout { .. })));

        let unshorten = svc.unshorten("url.shorten/abc").await;
        assert!(matches!(unshorten, Err(AppError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_storage_healthy_false_on_timeout() {
        assert!(!slow_service().storage_healthy().await);
    }
}
