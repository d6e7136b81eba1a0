use anyhow::Result;
use chrono::{DateTime, Utc};
use oddsline_lib::{CacheEntry, LedgerDay, OutcomeRow};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

#[derive(Tabled, Serialize)]
struct OddsRow {
    #[tabled(rename = "Start (UTC)")]
    #[serde(rename = "Start (UTC)")]
    start: String,
    #[tabled(rename = "Matchup")]
    #[serde(rename = "Matchup")]
    matchup: String,
    #[tabled(rename = "Book")]
    #[serde(rename = "Book")]
    bookmaker: String,
    #[tabled(rename = "Market")]
    #[serde(rename = "Market")]
    market: String,
    #[tabled(rename = "Outcome")]
    #[serde(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "Point")]
    #[serde(rename = "Point")]
    point: String,
    #[tabled(rename = "Price")]
    #[serde(rename = "Price")]
    price: String,
}

#[derive(Tabled, Serialize)]
struct LedgerRow {
    #[tabled(rename = "Date")]
    #[serde(rename = "Date")]
    date: String,
    #[tabled(rename = "Credits Used")]
    #[serde(rename = "Credits Used")]
    credits_used: u64,
    #[tabled(rename = "Budget")]
    #[serde(rename = "Budget")]
    budget: u64,
}

#[derive(Tabled, Serialize)]
struct CacheRow {
    #[tabled(rename = "Key")]
    #[serde(rename = "Key")]
    key: String,
    #[tabled(rename = "Fetched At")]
    #[serde(rename = "Fetched At")]
    fetched_at: String,
    #[tabled(rename = "TTL (min)")]
    #[serde(rename = "TTL (min)")]
    ttl_minutes: u32,
    #[tabled(rename = "Fresh")]
    #[serde(rename = "Fresh")]
    fresh: bool,
    #[tabled(rename = "Bytes")]
    #[serde(rename = "Bytes")]
    bytes: usize,
    #[tabled(rename = "Request")]
    #[serde(rename = "Request")]
    request: String,
}

// -- Row builders --

fn build_odds_rows(rows: &[OutcomeRow]) -> Vec<OddsRow> {
    rows.iter()
        .map(|r| OddsRow {
            start: r
                .commence_time
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            matchup: format!("{} @ {}", r.away_team, r.home_team),
            bookmaker: r.bookmaker.clone(),
            market: r.market.clone(),
            outcome: r.outcome.clone(),
            point: r.point.map(format_point).unwrap_or_default(),
            price: format_price(r.price),
        })
        .collect()
}

fn build_ledger_rows(days: &[LedgerDay], budget: u64) -> Vec<LedgerRow> {
    days.iter()
        .map(|d| LedgerRow {
            date: d.date.to_string(),
            credits_used: d.credits_used,
            budget,
        })
        .collect()
}

fn build_cache_rows(entries: &[CacheEntry], now: DateTime<Utc>) -> Vec<CacheRow> {
    entries
        .iter()
        .map(|e| CacheRow {
            key: e.key.chars().take(12).collect(),
            fetched_at: e.fetched_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ttl_minutes: e.ttl_minutes,
            fresh: e.is_fresh_at(now, e.ttl_minutes),
            bytes: e.response_payload.len(),
            request: e.request_descriptor.clone(),
        })
        .collect()
}

// -- Printers --

pub fn print_odds(rows: &[OutcomeRow], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&rows),
        _ => print_rows(build_odds_rows(rows), format)?,
    }
    Ok(())
}

pub fn print_ledger(days: &[LedgerDay], budget: u64, format: &OutputFormat) -> Result<()> {
    print_rows(build_ledger_rows(days, budget), format)
}

pub fn print_cache_entries(
    entries: &[CacheEntry],
    now: DateTime<Utc>,
    format: &OutputFormat,
) -> Result<()> {
    print_rows(build_cache_rows(entries, now), format)
}

fn print_rows<R: Tabled + Serialize>(rows: Vec<R>, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", Table::new(rows)),
        OutputFormat::Markdown => {
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
    }
    Ok(())
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

/// American prices carry an explicit sign; decimal prices keep two places.
fn format_price(price: f64) -> String {
    if price.fract() == 0.0 && price.abs() >= 100.0 {
        format!("{:+}", price as i64)
    } else {
        format!("{:.2}", price)
    }
}

fn format_point(point: f64) -> String {
    format!("{:+}", point)
}
