//! Library layer for oddsline: a budgeted, caching adapter in front of The
//! Odds API.
//!
//! Requests are fingerprinted into cache keys, served from a SQLite cache
//! while fresh, and otherwise fetched with bounded retry under a hard daily
//! credit budget tracked in the same database.

pub mod adapter;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod fingerprint;
pub mod ledger;
pub mod odds;
pub mod store;

pub use oddsapi;
pub use oddsapi::{DateFormat, OddsFormat, OddsQuery};

pub use adapter::{AdapterSettings, FetchAdapter, RawResponse, ResponseSource, RetryPolicy};
pub use cache::{CacheEntry, CacheStore};
pub use config::{AdapterConfig, ConfigError};
pub use db::{Db, DbError};
pub use error::FetchError;
pub use fingerprint::{fingerprint, ParamValue, RequestDescriptor};
pub use ledger::{today_utc, CreditLedger, LedgerDay};
pub use odds::{flatten_outcomes, normalize_games, GameLine, OddsClient, OutcomeRow};
pub use store::SqliteStore;
