//! Query builder for the `/v4/sports/{sport}/odds` endpoint.

use std::fmt;

use url::form_urlencoded;

/// Price format requested from the API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OddsFormat {
    #[default]
    Decimal,
    American,
}

impl fmt::Display for OddsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OddsFormat::Decimal => write!(f, "decimal"),
            OddsFormat::American => write!(f, "american"),
        }
    }
}

impl std::str::FromStr for OddsFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "decimal" => Ok(OddsFormat::Decimal),
            "american" => Ok(OddsFormat::American),
            other => Err(format!("unknown odds format '{}'", other)),
        }
    }
}

/// Timestamp format requested from the API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateFormat {
    #[default]
    Iso,
    Unix,
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateFormat::Iso => write!(f, "iso"),
            DateFormat::Unix => write!(f, "unix"),
        }
    }
}

impl std::str::FromStr for DateFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "iso" => Ok(DateFormat::Iso),
            "unix" => Ok(DateFormat::Unix),
            other => Err(format!("unknown date format '{}'", other)),
        }
    }
}

/// Parameters for one odds lookup.
///
/// List fields are sent comma-joined, which is how the API expects
/// `regions`, `markets`, `bookmakers` and `eventIds`.
#[derive(Clone, Debug, PartialEq)]
pub struct OddsQuery {
    pub sport: String,
    pub regions: Vec<String>,
    pub markets: Vec<String>,
    pub odds_format: OddsFormat,
    pub date_format: DateFormat,
    pub bookmakers: Vec<String>,
    pub event_ids: Vec<String>,
}

impl OddsQuery {
    /// A query for `sport` in the `us` region with head-to-head markets.
    pub fn new(sport: &str) -> Self {
        Self {
            sport: sport.to_string(),
            regions: vec!["us".to_string()],
            markets: vec!["h2h".to_string()],
            odds_format: OddsFormat::default(),
            date_format: DateFormat::default(),
            bookmakers: Vec::new(),
            event_ids: Vec::new(),
        }
    }

    pub fn with_regions(mut self, regions: &[&str]) -> Self {
        self.regions = regions.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn with_markets(mut self, markets: &[&str]) -> Self {
        self.markets = markets.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_odds_format(mut self, odds_format: OddsFormat) -> Self {
        self.odds_format = odds_format;
        self
    }

    pub fn with_date_format(mut self, date_format: DateFormat) -> Self {
        self.date_format = date_format;
        self
    }

    pub fn with_bookmaker(mut self, bookmaker: &str) -> Self {
        self.bookmakers.push(bookmaker.to_string());
        self
    }

    pub fn with_event_id(mut self, event_id: &str) -> Self {
        self.event_ids.push(event_id.to_string());
        self
    }

    /// Endpoint path for this query, relative to the API base URL.
    ///
    /// The sport key is encoded as a single segment, so a `/` in it cannot
    /// select a different endpoint.
    pub fn path(&self) -> String {
        let sport: String = form_urlencoded::byte_serialize(self.sport.trim().as_bytes()).collect();
        format!("/v4/sports/{}/odds", sport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let q = OddsQuery::new("basketball_nba");
        assert_eq!(q.path(), "/v4/sports/basketball_nba/odds");
        assert_eq!(q.regions, vec!["us"]);
        assert_eq!(q.markets, vec!["h2h"]);
        assert_eq!(q.odds_format.to_string(), "decimal");
        assert_eq!(q.date_format.to_string(), "iso");
    }

    #[test]
    fn builder_chain() {
        let q = OddsQuery::new("americanfootball_nfl")
            .with_markets(&["h2h", "spreads"])
            .with_odds_format(OddsFormat::American)
            .with_bookmaker("draftkings")
            .with_event_id("abc");
        assert_eq!(q.markets, vec!["h2h", "spreads"]);
        assert_eq!(q.bookmakers, vec!["draftkings"]);
        assert_eq!(q.event_ids, vec!["abc"]);
        assert_eq!(q.odds_format, OddsFormat::American);
    }

    #[test]
    fn sport_is_a_single_path_segment() {
        assert_eq!(OddsQuery::new("a/b").path(), "/v4/sports/a%2Fb/odds");
        assert_eq!(OddsQuery::new("../x").path(), "/v4/sports/..%2Fx/odds");
        assert_eq!(OddsQuery::new(" ").path(), "/v4/sports//odds");
    }

    #[test]
    fn format_parsing() {
        assert_eq!("American".parse::<OddsFormat>(), Ok(OddsFormat::American));
        assert_eq!("unix".parse::<DateFormat>(), Ok(DateFormat::Unix));
        assert!("fractional".parse::<OddsFormat>().is_err());
    }
}
