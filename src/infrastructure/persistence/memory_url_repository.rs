//! In-process implementation of the URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// A repository that keeps records in memory.
///
/// Mirrors the PostgreSQL semantics: unique `short_url`, store-assigned
/// timestamps, conditional renewal. All state is lost on restart.
///
/// # Use Cases
///
/// - Local runs without a database (`STORAGE_BACKEND=memory`)
/// - HTTP handler tests
pub struct MemoryUrlRepository {
    inner: RwLock<Inner>,
}

struct Inner {
    records: Vec<UrlRecord>,
    next_id: i64,
}

impl MemoryUrlRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        debug!("Using in-memory URL storage");
        Self {
            inner: RwLock::new(Inner {
                records: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Inserts a fully-formed record, bypassing timestamp assignment.
    ///
    /// Lets callers seed rows with arbitrary expiry and creation times.
    pub async fn seed(&self, record: UrlRecord) -> Result<UrlRecord, AppError> {
        let mut inner = self.inner.write().await;
        if inner.records.iter().any(|r| r.short_url == record.short_url) {
            return Err(duplicate(&record.short_url));
        }
        inner.next_id = inner.next_id.max(record.id + 1);
        inner.records.push(record.clone());
        Ok(record)
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryUrlRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn duplicate(short_url: &str) -> AppError {
    AppError::conflict(
        "Short URL already exists",
        json!({ "short_url": short_url }),
    )
}

#[async_trait]
impl UrlRepository for MemoryUrlRepository {
    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<UrlRecord>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .iter()
            .filter(|r| r.long_url == long_url)
            .max_by_key(|r| r.id)
            .cloned())
    }

    async fn find_by_short_url(&self, short_url: &str) -> Result<Option<UrlRecord>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .iter()
            .find(|r| r.short_url == short_url)
            .cloned())
    }

    async fn insert(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError> {
        let mut inner = self.inner.write().await;

        if inner
            .records
            .iter()
            .any(|r| r.short_url == new_record.short_url)
        {
            return Err(duplicate(&new_record.short_url));
        }

        let now = Utc::now();
        let record = UrlRecord {
            id: inner.next_id,
            long_url: new_record.long_url,
            short_url: new_record.short_url,
            expiry_time: new_record.expiry_time,
            created_at: now,
            updated_at: now,
        };
        inner.next_id += 1;
        inner.records.push(record.clone());

        Ok(record)
    }

    async fn renew(
        &self,
        short_url: &str,
        long_url: &str,
        expiry_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<UrlRecord>, AppError> {
        let mut inner = self.inner.write().await;

        let Some(record) = inner.records.iter_mut().find(|r| {
            r.short_url == short_url && r.long_url == long_url && r.expiry_time < now
        }) else {
            return Ok(None);
        };

        record.expiry_time = expiry_time;
        record.updated_at = Utc::now();

        Ok(Some(record.clone()))
    }

    async fn health_check(&self) -> bool {
        true
    }
}
