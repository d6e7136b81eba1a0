//! Daily credit ledger and the in-process admission gate in front of it.

use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::db::DbError;
use crate::error::FetchError;

/// One ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerDay {
    pub date: NaiveDate,
    pub credits_used: u64,
}

/// The ledger's current day. Rolls over at strict UTC midnight.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Durable per-day counter of billable credits.
///
/// Increments are additive; a day's counter is never reset.
pub trait CreditLedger: Send + Sync {
    fn used_today(&self) -> Result<u64, DbError>;
    /// Adds `amount` to today's counter and returns the new total.
    fn increment_today(&self, amount: u64) -> Result<u64, DbError>;
}

/// Serializes the budget check so concurrent callers cannot jointly
/// overspend.
///
/// Admission reads the ledger and reserves one credit for the call under a
/// single lock. The reservation counts against the budget until the
/// returned [`Reservation`] is dropped, which the adapter does after the
/// real cost has been written to the ledger (or the call failed).
pub struct CreditGate {
    in_flight: Mutex<u64>,
}

impl Default for CreditGate {
    fn default() -> Self {
        Self::new()
    }
}

impl CreditGate {
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(0),
        }
    }

    /// Admits one billable call if today's usage plus pending calls is under
    /// `budget`.
    pub fn admit(
        &self,
        ledger: &dyn CreditLedger,
        budget: u64,
    ) -> Result<Reservation<'_>, FetchError> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        let used = ledger.used_today()?;
        let committed = used.saturating_add(*in_flight);
        if committed >= budget {
            return Err(FetchError::BudgetExceeded { used, budget });
        }
        *in_flight += 1;
        Ok(Reservation { gate: self })
    }

    /// Calls admitted but not yet settled.
    pub fn in_flight(&self) -> u64 {
        *self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A pending billable call. Releases its slot on drop.
pub struct Reservation<'a> {
    gate: &'a CreditGate,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.gate.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        *in_flight = in_flight.saturating_sub(1);
    }
}
