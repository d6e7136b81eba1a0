//! SQLite storage for cached API responses and the daily credit ledger.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::cache::CacheEntry;
use crate::ledger::LedgerDay;

const SCHEMA_VERSION: i32 = 1;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Local persistence failure.
#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("date parse error: {0}")]
    Date(#[from] chrono::ParseError),
}

pub struct Db {
    conn: Connection,
}

type CacheRow = (String, String, i64, String, String);

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<(), DbError> {
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        let schema = include_str!("../../schema/sqlite.sql");
        self.conn.execute_batch(schema)?;

        if version < SCHEMA_VERSION {
            self.conn
                .pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }

        Ok(())
    }

    pub fn get_cache_entry(&self, key: &str) -> Result<Option<CacheEntry>, DbError> {
        let row: Option<CacheRow> = self
            .conn
            .query_row(
                "SELECT cache_key, fetched_at, ttl_minutes, request_descriptor, response_payload
                 FROM api_cache WHERE cache_key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .optional()?;
        row.map(cache_entry_from_row).transpose()
    }

    /// Insert or overwrite the entry for `entry.key`. Last writer wins.
    pub fn upsert_cache_entry(&self, entry: &CacheEntry) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO api_cache (cache_key, fetched_at, ttl_minutes, request_descriptor, response_payload)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(cache_key) DO UPDATE SET
               fetched_at = excluded.fetched_at,
               ttl_minutes = excluded.ttl_minutes,
               request_descriptor = excluded.request_descriptor,
               response_payload = excluded.response_payload",
            params![
                entry.key,
                entry.fetched_at.to_rfc3339_opts(SecondsFormat::Micros, true),
                entry.ttl_minutes,
                entry.request_descriptor,
                entry.response_payload,
            ],
        )?;
        Ok(())
    }

    /// Most recently fetched cache entries first.
    pub fn list_cache_entries(&self, limit: i64) -> Result<Vec<CacheEntry>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT cache_key, fetched_at, ttl_minutes, request_descriptor, response_payload
             FROM api_cache ORDER BY fetched_at DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })?
            .collect::<Result<Vec<CacheRow>, _>>()?;
        rows.into_iter().map(cache_entry_from_row).collect()
    }

    pub fn credits_used_on(&self, date: NaiveDate) -> Result<u64, DbError> {
        let used: Option<i64> = self
            .conn
            .query_row(
                "SELECT credits_used FROM credit_ledger WHERE date = ?1",
                params![date.format(DATE_FORMAT).to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(used.unwrap_or(0).max(0) as u64)
    }

    /// Add `amount` to the day's counter, creating the row on first use.
    /// Returns the new total for that day.
    ///
    /// The counter saturates at `i64::MAX` and never decreases.
    pub fn add_credits_on(&self, date: NaiveDate, amount: u64) -> Result<u64, DbError> {
        let amount = i64::try_from(amount).unwrap_or(i64::MAX);
        let total: i64 = self.conn.query_row(
            "INSERT INTO credit_ledger (date, credits_used) VALUES (?1, ?2)
             ON CONFLICT(date) DO UPDATE SET credits_used =
                CASE WHEN credits_used > 9223372036854775807 - excluded.credits_used
                     THEN 9223372036854775807
                     ELSE credits_used + excluded.credits_used
                END
             RETURNING credits_used",
            params![date.format(DATE_FORMAT).to_string(), amount],
            |row| row.get(0),
        )?;
        Ok(total.max(0) as u64)
    }

    /// Ledger rows, most recent day first.
    pub fn credit_history(&self, days: i64) -> Result<Vec<LedgerDay>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, credits_used FROM credit_ledger ORDER BY date DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![days], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(date, used)| -> Result<LedgerDay, DbError> {
                Ok(LedgerDay {
                    date: NaiveDate::parse_from_str(&date, DATE_FORMAT)?,
                    credits_used: used.max(0) as u64,
                })
            })
            .collect()
    }
}

fn cache_entry_from_row(row: CacheRow) -> Result<CacheEntry, DbError> {
    let (key, fetched_at, ttl_minutes, request_descriptor, response_payload) = row;
    Ok(CacheEntry {
        key,
        fetched_at: DateTime::parse_from_rfc3339(&fetched_at)?.with_timezone(&Utc),
        ttl_minutes: ttl_minutes.clamp(0, u32::MAX as i64) as u32,
        request_descriptor,
        response_payload,
    })
}
