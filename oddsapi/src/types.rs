//! Wire shapes returned by the odds endpoint.
//!
//! Fields the API sometimes omits are optional so that a single odd game does
//! not fail the whole payload.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A timestamp in either of the API's date formats (`iso` or `unix`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTime {
    Iso(DateTime<Utc>),
    Unix(i64),
}

impl EventTime {
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        match self {
            EventTime::Iso(dt) => Some(dt),
            EventTime::Unix(secs) => Utc.timestamp_opt(secs, 0).single(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub sport_key: String,
    #[serde(default)]
    pub sport_title: Option<String>,
    #[serde(default)]
    pub commence_time: Option<EventTime>,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    #[serde(default)]
    pub bookmakers: Vec<Bookmaker>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmaker {
    pub key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub last_update: Option<EventTime>,
    #[serde(default)]
    pub markets: Vec<Market>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub key: String,
    #[serde(default)]
    pub last_update: Option<EventTime>,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub point: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}
