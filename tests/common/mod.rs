#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use url_shorten::application::services::ShortenerSettings;
use url_shorten::domain::entities::{NewUrlRecord, UrlRecord};
use url_shorten::domain::repositories::UrlRepository;
use url_shorten::error::AppError;
use url_shorten::infrastructure::persistence::MemoryUrlRepository;
use url_shorten::routes::build_router;
use url_shorten::state::AppState;

pub fn create_test_state() -> (AppState, Arc<MemoryUrlRepository>) {
    let repo = Arc::new(MemoryUrlRepository::new());
    let state = AppState::new(repo.clone(), ShortenerSettings::default());
    (state, repo)
}

pub fn create_test_server() -> (TestServer, Arc<MemoryUrlRepository>) {
    let (state, repo) = create_test_state();
    let server = TestServer::new(build_router(state)).unwrap();
    (server, repo)
}

pub fn server_over(repo: Arc<dyn UrlRepository>, settings: ShortenerSettings) -> TestServer {
    TestServer::new(build_router(AppState::new(repo, settings))).unwrap()
}

pub fn record(long_url: &str, short_url: &str, expiry_time: DateTime<Utc>) -> UrlRecord {
    let created = Utc::now() - Duration::hours(3);
    UrlRecord {
        id: 1,
        long_url: long_url.to_string(),
        short_url: short_url.to_string(),
        expiry_time,
        created_at: created,
        updated_at: created,
    }
}

pub async fn seed_expired(repo: &MemoryUrlRepository, long_url: &str, short_url: &str) -> UrlRecord {
    repo.seed(record(long_url, short_url, Utc::now() - Duration::hours(1)))
        .await
        .unwrap()
}

pub async fn seed_active(repo: &MemoryUrlRepository, long_url: &str, short_url: &str) -> UrlRecord {
    repo.seed(record(long_url, short_url, Utc::now() + Duration::minutes(30)))
        .await
        .unwrap()
}

/// Store whose every call fails the way the named error does.
pub struct FailingRepository {
    pub timeout: bool,
}

impl FailingRepository {
    async fn fail<T>(&self) -> Result<T, AppError> {
        if self.timeout {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        }
        Err(AppError::storage("Database error", json!({})))
    }
}

#[async_trait]
impl UrlRepository for FailingRepository {
    async fn find_by_long_url(&self, _: &str) -> Result<Option<UrlRecord>, AppError> {
        self.fail().await
    }

    async fn find_by_short_url(&self, _: &str) -> Result<Option<UrlRecord>, AppError> {
        self.fail().await
    }

    async fn insert(&self, _: NewUrlRecord) -> Result<UrlRecord, AppError> {
        self.fail().await
    }

    async fn renew(
        &self,
        _: &str,
        _: &str,
        _: DateTime<Utc>,
        _: DateTime<Utc>,
    ) -> Result<Option<UrlRecord>, AppError> {
        self.fail().await
    }

    async fn health_check(&self) -> bool {
        false
    }
}

pub fn short_timeout_settings() -> ShortenerSettings {
    ShortenerSettings {
        storage_timeout: std::time::Duration::from_millis(50),
        ..ShortenerSettings::default()
    }
}
