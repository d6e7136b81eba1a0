//! The `odds` subcommand: fetch odds through the budgeted adapter.

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use oddsline_lib::odds::nba_query;
use oddsline_lib::{
    flatten_outcomes, AdapterConfig, DateFormat, FetchAdapter, OddsClient, OddsFormat, OddsQuery,
    SqliteStore,
};

use crate::output::{print_odds, OutputFormat};

#[derive(Args)]
pub struct OddsArgs {
    /// Sport key (e.g. basketball_nba, americanfootball_nfl)
    #[arg(long, default_value = "basketball_nba")]
    pub sport: String,

    /// Comma-separated bookmaker regions (e.g. us,uk)
    #[arg(long, default_value = "us")]
    pub regions: String,

    /// Comma-separated markets (e.g. h2h,spreads,totals)
    #[arg(long, default_value = "h2h,spreads,totals")]
    pub markets: String,

    /// Price format: american or decimal
    #[arg(long, default_value = "american")]
    pub odds_format: String,

    /// Timestamp format: iso or unix
    #[arg(long, default_value = "iso")]
    pub date_format: String,

    /// Comma-separated bookmaker keys to restrict to
    #[arg(long)]
    pub bookmakers: Option<String>,

    /// Restrict to an event ID (repeatable)
    #[arg(long = "event-id")]
    pub event_ids: Vec<String>,

    /// Cache TTL in minutes for this call (default from ODDS_DEFAULT_TTL_MINUTES)
    #[arg(long)]
    pub ttl: Option<u32>,

    /// Moneylines only; uses the NBA preset and ignores --sport and --markets
    #[arg(long)]
    pub fast: bool,
}

pub async fn run(
    args: &OddsArgs,
    config: &AdapterConfig,
    store: Arc<SqliteStore>,
    format: &OutputFormat,
) -> Result<()> {
    if config.api_key.is_empty() {
        bail!("ODDS_API_KEY is not set");
    }

    let query = build_query(args)?;
    let adapter = Arc::new(FetchAdapter::with_sqlite(config, store));
    let client = OddsClient::new(adapter.clone());

    let games = client.get_odds(&query, args.ttl).await?;
    let rows = flatten_outcomes(&games);
    print_odds(&rows, format)?;

    let used = adapter.credits_used_today()?;
    eprintln!(
        "{} game(s), {} outcome(s); credits used today: {}/{}",
        games.len(),
        rows.len(),
        used,
        config.daily_budget
    );
    Ok(())
}

fn build_query(args: &OddsArgs) -> Result<OddsQuery> {
    if args.fast {
        return Ok(nba_query(true));
    }

    let odds_format: OddsFormat = args.odds_format.parse().map_err(anyhow::Error::msg)?;
    let date_format: DateFormat = args.date_format.parse().map_err(anyhow::Error::msg)?;

    let regions = split_list(&args.regions);
    let markets = split_list(&args.markets);
    if regions.is_empty() || markets.is_empty() {
        bail!("--regions and --markets must each name at least one value");
    }

    let mut query = OddsQuery::new(&args.sport)
        .with_regions(&regions)
        .with_markets(&markets)
        .with_odds_format(odds_format)
        .with_date_format(date_format);
    if let Some(ref bookmakers) = args.bookmakers {
        for book in split_list(bookmakers) {
            query = query.with_bookmaker(book);
        }
    }
    for event_id in &args.event_ids {
        query = query.with_event_id(event_id);
    }
    Ok(query)
}

fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
