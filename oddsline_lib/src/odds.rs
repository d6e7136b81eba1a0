//! Typed client for odds data, built on the fetch adapter.
//!
//! Builds request descriptors from [`OddsQuery`] values and normalizes the
//! raw payload into [`GameLine`] records. Caching and quota decisions stay
//! in the adapter.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use oddsapi::types::Game;
use oddsapi::{DateFormat, OddsFormat, OddsQuery};
use serde::Serialize;

use crate::adapter::FetchAdapter;
use crate::error::FetchError;
use crate::fingerprint::RequestDescriptor;

pub const NBA_SPORT_KEY: &str = "basketball_nba";

/// One game with every bookmaker market that was quoted for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameLine {
    pub game_id: String,
    pub sport_key: String,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub commence_time: Option<DateTime<Utc>>,
    pub books: Vec<BookLine>,
}

/// One bookmaker's prices for one market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookLine {
    pub bookmaker: String,
    pub market: String,
    pub last_update: Option<DateTime<Utc>>,
    pub outcomes: Vec<OutcomePrice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomePrice {
    pub name: String,
    pub price: f64,
    pub point: Option<f64>,
}

/// A single priced outcome with its game context, for tabular output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeRow {
    pub game_id: String,
    pub commence_time: Option<DateTime<Utc>>,
    pub home_team: String,
    pub away_team: String,
    pub bookmaker: String,
    pub market: String,
    pub outcome: String,
    pub price: f64,
    pub point: Option<f64>,
}

pub struct OddsClient {
    adapter: Arc<FetchAdapter>,
}

impl OddsClient {
    pub fn new(adapter: Arc<FetchAdapter>) -> Self {
        Self { adapter }
    }

    /// Fetches odds for `query` and normalizes them.
    ///
    /// Adapter errors propagate unchanged. A payload that cannot be
    /// normalized yields an empty list.
    pub async fn get_odds(
        &self,
        query: &OddsQuery,
        ttl_override: Option<u32>,
    ) -> Result<Vec<GameLine>, FetchError> {
        let descriptor = descriptor_for(query);
        let response = self.adapter.fetch_or_serve(&descriptor, ttl_override).await?;
        Ok(normalize_games(&response.body))
    }

    /// Today's NBA games with moneyline, spread and total markets from US
    /// books, in American odds. Fast mode asks for moneylines only.
    pub async fn nba_games_and_markets(&self, fast_mode: bool) -> Result<Vec<GameLine>, FetchError> {
        let query = nba_query(fast_mode);
        self.get_odds(&query, None).await
    }
}

pub fn nba_query(fast_mode: bool) -> OddsQuery {
    let markets: &[&str] = if fast_mode {
        &["h2h"]
    } else {
        &["h2h", "spreads", "totals"]
    };
    OddsQuery::new(NBA_SPORT_KEY)
        .with_regions(&["us"])
        .with_markets(markets)
        .with_odds_format(OddsFormat::American)
        .with_date_format(DateFormat::Iso)
}

pub fn descriptor_for(query: &OddsQuery) -> RequestDescriptor {
    let mut descriptor = RequestDescriptor::new(query.path())
        .with_list("regions", query.regions.iter().cloned())
        .with_list("markets", query.markets.iter().cloned())
        .with_param("oddsFormat", query.odds_format.to_string())
        .with_param("dateFormat", query.date_format.to_string());
    if !query.bookmakers.is_empty() {
        descriptor = descriptor.with_list("bookmakers", query.bookmakers.iter().cloned());
    }
    if !query.event_ids.is_empty() {
        descriptor = descriptor.with_list("eventIds", query.event_ids.iter().cloned());
    }
    descriptor
}

/// Parses an odds payload into game lines.
///
/// Anything other than a JSON array gives an empty list; games that do not
/// match the expected shape are skipped. Both cases are logged.
pub fn normalize_games(body: &str) -> Vec<GameLine> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("odds payload is not valid JSON, returning no games: {}", e);
            return Vec::new();
        }
    };
    let serde_json::Value::Array(items) = value else {
        tracing::warn!("odds payload is not a list of games, returning no games");
        return Vec::new();
    };

    let mut games = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Game>(item) {
            Ok(game) => games.push(GameLine::from(game)),
            Err(e) => tracing::warn!("skipping malformed game at index {}: {}", idx, e),
        }
    }
    games
}

impl From<Game> for GameLine {
    fn from(game: Game) -> Self {
        let books = game
            .bookmakers
            .into_iter()
            .flat_map(|book| {
                let bookmaker = book.key;
                book.markets.into_iter().map(move |market| BookLine {
                    bookmaker: bookmaker.clone(),
                    market: market.key,
                    last_update: market
                        .last_update
                        .or(book.last_update)
                        .and_then(|t| t.to_datetime()),
                    outcomes: market
                        .outcomes
                        .into_iter()
                        .map(|o| OutcomePrice {
                            name: o.description.map_or(o.name.clone(), |d| format!("{} {}", d, o.name)),
                            price: o.price,
                            point: o.point,
                        })
                        .collect(),
                })
            })
            .collect();
        GameLine {
            game_id: game.id,
            sport_key: game.sport_key,
            home_team: game.home_team,
            away_team: game.away_team,
            commence_time: game.commence_time.and_then(|t| t.to_datetime()),
            books,
        }
    }
}

/// One row per priced outcome, in payload order.
pub fn flatten_outcomes(games: &[GameLine]) -> Vec<OutcomeRow> {
    let mut rows = Vec::new();
    for game in games {
        for book in &game.books {
            for outcome in &book.outcomes {
                rows.push(OutcomeRow {
                    game_id: game.game_id.clone(),
                    commence_time: game.commence_time,
                    home_team: game.home_team.clone().unwrap_or_default(),
                    away_team: game.away_team.clone().unwrap_or_default(),
                    bookmaker: book.bookmaker.clone(),
                    market: book.market.clone(),
                    outcome: outcome.name.clone(),
                    price: outcome.price,
                    point: outcome.point,
                });
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::{fingerprint, ParamValue};

    const PAYLOAD: &str = r#"[
        {
            "id": "g1",
            "sport_key": "basketball_nba",
            "commence_time": "2024-01-15T00:10:00Z",
            "home_team": "Boston Celtics",
            "away_team": "Houston Rockets",
            "bookmakers": [{
                "key": "draftkings",
                "last_update": "2024-01-14T18:55:12Z",
                "markets": [
                    {"key": "h2h", "outcomes": [
                        {"name": "Boston Celtics", "price": -600},
                        {"name": "Houston Rockets", "price": 450}
                    ]},
                    {"key": "totals", "outcomes": [
                        {"name": "Over", "price": -110, "point": 228.5},
                        {"name": "Under", "price": -110, "point": 228.5}
                    ]}
                ]
            }]
        },
        {"sport_key": "basketball_nba", "home_team": "No Id"}
    ]"#;

    #[test]
    fn normalizes_games_and_skips_malformed_ones() {
        let games = normalize_games(PAYLOAD);
        assert_eq!(games.len(), 1);
        let g = &games[0];
        assert_eq!(g.game_id, "g1");
        assert_eq!(g.home_team.as_deref(), Some("Boston Celtics"));
        assert_eq!(g.books.len(), 2);
        assert_eq!(g.books[1].market, "totals");
        assert_eq!(g.books[1].outcomes[0].point, Some(228.5));
        // market inherits the bookmaker's timestamp
        assert!(g.books[0].last_update.is_some());
    }

    #[test]
    fn malformed_payloads_give_empty_results() {
        assert!(normalize_games("not json").is_empty());
        assert!(normalize_games(r#"{"message": "quota reached"}"#).is_empty());
        assert!(normalize_games("[]").is_empty());
    }

    #[test]
    fn flatten_produces_one_row_per_outcome() {
        let rows = flatten_outcomes(&normalize_games(PAYLOAD));
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].bookmaker, "draftkings");
        assert_eq!(rows[0].market, "h2h");
        assert_eq!(rows[0].price, -600.0);
        assert_eq!(rows[3].outcome, "Under");
    }

    #[test]
    fn descriptor_carries_query_parameters() {
        let query = OddsQuery::new("basketball_nba")
            .with_markets(&["h2h", "spreads"])
            .with_bookmaker("fanduel")
            .with_event_id("e1");
        let d = descriptor_for(&query);
        assert_eq!(d.endpoint(), "/v4/sports/basketball_nba/odds");
        assert_eq!(
            d.params().get("markets"),
            Some(&ParamValue::List(vec!["h2h".to_string(), "spreads".to_string()]))
        );
        assert_eq!(
            d.params().get("oddsFormat"),
            Some(&ParamValue::Text("decimal".to_string()))
        );
        assert!(d.params().contains_key("bookmakers"));
        assert!(d.params().contains_key("eventIds"));
    }

    #[test]
    fn optional_filters_are_omitted_when_empty() {
        let d = descriptor_for(&OddsQuery::new("basketball_nba"));
        assert!(!d.params().contains_key("bookmakers"));
        assert!(!d.params().contains_key("eventIds"));
    }

    #[test]
    fn fast_mode_is_a_different_request() {
        let full = fingerprint(&descriptor_for(&nba_query(false))).unwrap();
        let fast = fingerprint(&descriptor_for(&nba_query(true))).unwrap();
        assert_ne!(full, fast);
        assert_eq!(nba_query(true).markets, vec!["h2h"]);
        assert_eq!(nba_query(false).odds_format, OddsFormat::American);
    }
}
