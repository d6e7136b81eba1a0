//! Error taxonomy for fetching metered upstream data.

use thiserror::Error;

use crate::db::DbError;

/// Errors raised by the fetch adapter.
///
/// Domain clients propagate these unchanged.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be fingerprinted. A caller bug; never retried.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Today's credits are spent. Wait for the next UTC day.
    #[error("Daily credit budget exceeded: {used} >= {budget}")]
    BudgetExceeded { used: u64, budget: u64 },
    /// Every attempt against the upstream API failed.
    #[error("Upstream failed after {attempts} attempt(s): {source}")]
    Upstream {
        attempts: u32,
        #[source]
        source: oddsapi::Error,
    },
    /// The credit ledger could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),
}
