//! URL record entity representing a long URL to short URL mapping.

use chrono::{DateTime, Utc};

/// A persisted mapping between a long URL and its derived short URL.
///
/// `short_url` is unique and is a pure function of `long_url`. Expiry is
/// logical: an expired record stays in storage until it is renewed.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UrlRecord {
    pub id: i64,
    pub long_url: String,
    pub short_url: String,
    pub expiry_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Returns true if the record expired strictly before `now`.
    ///
    /// A record whose expiry equals `now` is still valid.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_time < now
    }

    /// Returns true if the record has expired as of the current time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Input data for inserting a new record.
///
/// Timestamps other than `expiry_time` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlRecord {
    pub long_url: String,
    pub short_url: String,
    pub expiry_time: DateTime<Utc>,
}
