mod commands;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use oddsline_lib::{AdapterConfig, SqliteStore};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "oddsline")]
#[command(about = "Fetch betting odds through a cached, credit-budgeted API adapter")]
struct Cli {
    /// Output format: table, json, csv, or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// SQLite database path (overrides DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch odds for a sport (served from cache while fresh)
    Odds(commands::odds::OddsArgs),
    /// Show the daily credit ledger
    Credits(commands::credits::CreditsArgs),
    /// List cached responses
    Cache(commands::cache::CacheArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("oddsline=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        "markdown" | "md" => OutputFormat::Markdown,
        _ => OutputFormat::Table,
    };

    let mut config = AdapterConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let store = Arc::new(
        SqliteStore::open(&config.db_path)
            .with_context(|| format!("opening database {}", config.db_path.display()))?,
    );

    match &cli.command {
        Commands::Odds(args) => commands::odds::run(args, &config, store, &format).await?,
        Commands::Credits(args) => commands::credits::run(args, &config, &store, &format)?,
        Commands::Cache(args) => commands::cache::run(args, &config, &store, &format)?,
    }

    Ok(())
}
