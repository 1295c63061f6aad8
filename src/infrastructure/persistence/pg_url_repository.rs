//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// PostgreSQL repository for URL records.
///
/// Uniqueness of `short_url` is enforced by the `urls_short_url_key`
/// constraint; violations surface as [`AppError::Conflict`].
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<UrlRecord>, AppError> {
        let record = sqlx::query_as::<_, UrlRecord>(
            r#"
            SELECT id, long_url, short_url, expiry_time, created_at, updated_at
            FROM urls
            WHERE long_url = $1
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(long_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn find_by_short_url(&self, short_url: &str) -> Result<Option<UrlRecord>, AppError> {
        let record = sqlx::query_as::<_, UrlRecord>(
            r#"
            SELECT id, long_url, short_url, expiry_time, created_at, updated_at
            FROM urls
            WHERE short_url = $1
            "#,
        )
        .bind(short_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn insert(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError> {
        let record = sqlx::query_as::<_, UrlRecord>(
            r#"
            INSERT INTO urls (long_url, short_url, expiry_time)
            VALUES ($1, $2, $3)
            RETURNING id, long_url, short_url, expiry_time, created_at, updated_at
            "#,
        )
        .bind(&new_record.long_url)
        .bind(&new_record.short_url)
        .bind(new_record.expiry_time)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn renew(
        &self,
        short_url: &str,
        long_url: &str,
        expiry_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<UrlRecord>, AppError> {
        // Single conditional UPDATE: of two concurrent renewals only one matches.
        let record = sqlx::query_as::<_, UrlRecord>(
            r#"
            UPDATE urls
            SET expiry_time = $3, updated_at = NOW()
            WHERE short_url = $1 AND long_url = $2 AND expiry_time < $4
            RETURNING id, long_url, short_url, expiry_time, created_at, updated_at
            "#,
        )
        .bind(short_url)
        .bind(long_url)
        .bind(expiry_time)
        .bind(now)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
