//! The `cache` subcommand: list stored responses and their freshness.

use anyhow::Result;
use clap::Args;
use oddsline_lib::{AdapterConfig, SqliteStore};

use crate::output::{print_cache_entries, OutputFormat};

#[derive(Args)]
pub struct CacheArgs {
    /// Maximum number of entries to show, newest first
    #[arg(long, default_value = "20")]
    pub limit: i64,
}

pub fn run(
    args: &CacheArgs,
    config: &AdapterConfig,
    store: &SqliteStore,
    format: &OutputFormat,
) -> Result<()> {
    let entries = store.list_cache_entries(args.limit.max(1))?;
    if entries.is_empty() {
        eprintln!("Cache at {} is empty", config.db_path.display());
        return Ok(());
    }
    print_cache_entries(&entries, chrono::Utc::now(), format)
}
