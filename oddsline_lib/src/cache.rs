//! Cache entries and the storage seam the fetch adapter reads and writes.
//!
//! The store only persists entries. Whether an entry is fresh is decided by
//! the caller with [`CacheEntry::is_fresh_at`], so the TTL can vary per call.

use chrono::{DateTime, Duration, Utc};

use crate::db::DbError;

/// One stored upstream response, keyed by request fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub fetched_at: DateTime<Utc>,
    /// TTL in force when the entry was written.
    pub ttl_minutes: u32,
    /// Canonical JSON of the request parameters, for auditing.
    pub request_descriptor: String,
    /// Raw response body.
    pub response_payload: String,
}

impl CacheEntry {
    /// Age of the entry at `now`. Negative if `fetched_at` is in the future.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    /// True iff `now - fetched_at < ttl_minutes`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, ttl_minutes: u32) -> bool {
        self.age_at(now) < Duration::minutes(i64::from(ttl_minutes))
    }
}

/// Durable key/value store of past responses.
///
/// `put` is an upsert: at most one entry exists per key.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, DbError>;
    fn put(&self, entry: &CacheEntry) -> Result<(), DbError>;
}
