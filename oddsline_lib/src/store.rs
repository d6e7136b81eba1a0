//! SQLite-backed implementation of the cache store and credit ledger.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::cache::{CacheEntry, CacheStore};
use crate::db::{Db, DbError};
use crate::ledger::{today_utc, CreditLedger, LedgerDay};

/// One SQLite database holding both the response cache and the ledger.
///
/// The connection is guarded by a mutex, so each statement runs alone and
/// concurrent cache writers to the same key resolve as last-writer-wins.
pub struct SqliteStore {
    db: Mutex<Db>,
}

impl SqliteStore {
    /// Opens (creating if needed) and initializes the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let db = Db::open(path)?;
        db.init()?;
        Ok(Self::new(db))
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let db = Db::open_in_memory()?;
        db.init()?;
        Ok(Self::new(db))
    }

    pub fn new(db: Db) -> Self {
        Self { db: Mutex::new(db) }
    }

    fn db(&self) -> MutexGuard<'_, Db> {
        self.db.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn list_cache_entries(&self, limit: i64) -> Result<Vec<CacheEntry>, DbError> {
        self.db().list_cache_entries(limit)
    }

    pub fn credit_history(&self, days: i64) -> Result<Vec<LedgerDay>, DbError> {
        self.db().credit_history(days)
    }
}

impl CacheStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, DbError> {
        self.db().get_cache_entry(key)
    }

    fn put(&self, entry: &CacheEntry) -> Result<(), DbError> {
        self.db().upsert_cache_entry(entry)
    }
}

impl CreditLedger for SqliteStore {
    fn used_today(&self) -> Result<u64, DbError> {
        self.db().credits_used_on(today_utc())
    }

    fn increment_today(&self, amount: u64) -> Result<u64, DbError> {
        self.db().add_credits_on(today_utc(), amount)
    }
}
