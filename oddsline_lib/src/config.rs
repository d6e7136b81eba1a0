//! Adapter configuration, read from the environment.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.the-odds-api.com";
pub const DEFAULT_DB_PATH: &str = "oddsline.db";
pub const DEFAULT_DAILY_BUDGET: u64 = 200;
pub const DEFAULT_TTL_MINUTES: u32 = 20;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_COST_HEADERS: &[&str] = &["x-credits-used", "x-requests-last"];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got '{value}'")]
    InvalidNumber { key: String, value: String },
}

#[derive(Clone)]
pub struct AdapterConfig {
    pub api_key: String,
    pub base_url: String,
    pub db_path: PathBuf,
    /// Billable credits allowed per UTC day.
    pub daily_budget: u64,
    pub default_ttl_minutes: u32,
    /// Total attempts per fetch, including the first. At least 1.
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    /// Per-attempt HTTP timeout.
    pub request_timeout: Duration,
    /// Response headers consulted, in order, for the cost of a call.
    pub cost_headers: Vec<String>,
}

impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("base_url", &self.base_url)
            .field("db_path", &self.db_path)
            .field("daily_budget", &self.daily_budget)
            .field("default_ttl_minutes", &self.default_ttl_minutes)
            .field("retry_attempts", &self.retry_attempts)
            .field("retry_delay", &self.retry_delay)
            .field("request_timeout", &self.request_timeout)
            .field("cost_headers", &self.cost_headers)
            .finish()
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            daily_budget: DEFAULT_DAILY_BUDGET,
            default_ttl_minutes: DEFAULT_TTL_MINUTES,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            cost_headers: DEFAULT_COST_HEADERS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

impl AdapterConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Unset or blank keys take
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let cost_headers = match get("ODDS_COST_HEADERS") {
            Some(list) => list
                .split(',')
                .map(|h| h.trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
            None => defaults.cost_headers,
        };

        Ok(Self {
            api_key: get("ODDS_API_KEY").unwrap_or_default(),
            base_url: get("ODDS_API_BASE_URL").unwrap_or(defaults.base_url),
            db_path: get("DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            daily_budget: parse_or("ODDS_DAILY_CREDIT_BUDGET", get, defaults.daily_budget)?,
            default_ttl_minutes: parse_or(
                "ODDS_DEFAULT_TTL_MINUTES",
                get,
                defaults.default_ttl_minutes,
            )?,
            retry_attempts: parse_or("RETRY_ATTEMPTS", get, defaults.retry_attempts)?.max(1),
            retry_delay: Duration::from_secs(parse_or(
                "RETRY_DELAY",
                get,
                DEFAULT_RETRY_DELAY_SECS,
            )?),
            request_timeout: Duration::from_secs(parse_or(
                "ODDS_REQUEST_TIMEOUT_SECS",
                get,
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            cost_headers,
        })
    }
}

fn parse_or<T, G>(key: &str, get: G, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidNumber {
            key: key.to_string(),
            value: raw,
        }),
    }
}
