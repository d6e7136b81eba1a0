//! The `credits` subcommand: show credit consumption per UTC day.

use anyhow::Result;
use clap::Args;
use oddsline_lib::{today_utc, AdapterConfig, SqliteStore};

use crate::output::{print_ledger, OutputFormat};

#[derive(Args)]
pub struct CreditsArgs {
    /// Number of most recent days to show
    #[arg(long, default_value = "7")]
    pub days: i64,
}

pub fn run(
    args: &CreditsArgs,
    config: &AdapterConfig,
    store: &SqliteStore,
    format: &OutputFormat,
) -> Result<()> {
    let history = store.credit_history(args.days.max(1))?;
    print_ledger(&history, config.daily_budget, format)?;

    let today = today_utc();
    let used = history
        .iter()
        .find(|day| day.date == today)
        .map_or(0, |day| day.credits_used);
    eprintln!(
        "Ledger for {}: {} of {} credits used, {} remaining",
        today,
        used,
        config.daily_budget,
        config.daily_budget.saturating_sub(used)
    );
    Ok(())
}
