//! Budgeted, caching front for the metered odds API.
//!
//! Every request goes through [`FetchAdapter::fetch_or_serve`]:
//! fingerprint, cache lookup, budget admission, HTTP with bounded retry,
//! credit accounting, cache write. A fresh cache hit never touches the
//! network or the ledger.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;

use crate::cache::{CacheEntry, CacheStore};
use crate::config::AdapterConfig;
use crate::error::FetchError;
use crate::fingerprint::{fingerprint, RequestDescriptor};
use crate::ledger::{CreditGate, CreditLedger};
use crate::store::SqliteStore;

/// Fixed-delay retry schedule for upstream calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Pause between consecutive attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdapterSettings {
    pub daily_budget: u64,
    pub default_ttl_minutes: u32,
    pub retry: RetryPolicy,
    pub cost_headers: Vec<String>,
}

impl From<&AdapterConfig> for AdapterSettings {
    fn from(config: &AdapterConfig) -> Self {
        Self {
            daily_budget: config.daily_budget,
            default_ttl_minutes: config.default_ttl_minutes,
            retry: RetryPolicy {
                attempts: config.retry_attempts.max(1),
                delay: config.retry_delay,
            },
            cost_headers: config.cost_headers.clone(),
        }
    }
}

/// Where a response body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
}

/// A response body handed back to domain clients.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub body: String,
    pub cache_key: String,
    pub source: ResponseSource,
    /// Credits recorded for this call. Zero for cache hits.
    pub credits_charged: u64,
}

impl RawResponse {
    pub fn is_cache_hit(&self) -> bool {
        self.source == ResponseSource::Cache
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// The only writer of the response cache and the credit ledger.
///
/// Construct one per pipeline run and share it by reference or `Arc`.
pub struct FetchAdapter {
    client: oddsapi::Client,
    cache: Arc<dyn CacheStore>,
    ledger: Arc<dyn CreditLedger>,
    gate: CreditGate,
    settings: AdapterSettings,
}

impl FetchAdapter {
    pub fn new(
        client: oddsapi::Client,
        cache: Arc<dyn CacheStore>,
        ledger: Arc<dyn CreditLedger>,
        settings: AdapterSettings,
    ) -> Self {
        Self {
            client,
            cache,
            ledger,
            gate: CreditGate::new(),
            settings,
        }
    }

    /// Builds an adapter whose cache and ledger both live in `store`.
    pub fn with_sqlite(config: &AdapterConfig, store: Arc<SqliteStore>) -> Self {
        let client = oddsapi::Client::with_base_url(&config.base_url, &config.api_key)
            .with_timeout(config.request_timeout);
        Self::new(client, store.clone(), store, AdapterSettings::from(config))
    }

    pub fn settings(&self) -> &AdapterSettings {
        &self.settings
    }

    pub fn credits_used_today(&self) -> Result<u64, FetchError> {
        Ok(self.ledger.used_today()?)
    }

    pub fn credits_remaining_today(&self) -> Result<u64, FetchError> {
        let used = self.credits_used_today()?;
        Ok(self.settings.daily_budget.saturating_sub(used))
    }

    /// Serves `descriptor` from cache if fresh, otherwise fetches it from
    /// upstream within today's credit budget.
    ///
    /// `ttl_override` replaces the default TTL (in minutes) both for the
    /// freshness check and for the entry written on a miss.
    pub async fn fetch_or_serve(
        &self,
        descriptor: &RequestDescriptor,
        ttl_override: Option<u32>,
    ) -> Result<RawResponse, FetchError> {
        let cache_key = fingerprint(descriptor)?;
        let ttl_minutes = ttl_override.unwrap_or(self.settings.default_ttl_minutes);

        match self.cache.get(&cache_key) {
            Ok(Some(entry)) if entry.is_fresh_at(Utc::now(), ttl_minutes) => {
                tracing::info!(cache_key = %short(&cache_key), endpoint = descriptor.endpoint(), "cache hit");
                return Ok(RawResponse {
                    body: entry.response_payload,
                    cache_key,
                    source: ResponseSource::Cache,
                    credits_charged: 0,
                });
            }
            Ok(Some(entry)) => {
                tracing::info!(
                    cache_key = %short(&cache_key),
                    endpoint = descriptor.endpoint(),
                    "cache expired (fetched at {})",
                    entry.fetched_at
                );
            }
            Ok(None) => {
                tracing::info!(cache_key = %short(&cache_key), endpoint = descriptor.endpoint(), "cache miss");
            }
            Err(e) => {
                tracing::warn!(cache_key = %short(&cache_key), "cache read failed, treating as miss: {}", e);
            }
        }

        let reservation = match self.gate.admit(self.ledger.as_ref(), self.settings.daily_budget) {
            Ok(r) => r,
            Err(err) => {
                tracing::error!("{}", err);
                return Err(err);
            }
        };

        let response = self.get_with_retry(descriptor, &cache_key).await?;

        let credits = credits_for(&response, &self.settings.cost_headers);
        let total = self.ledger.increment_today(credits).map_err(|e| {
            tracing::error!(
                cache_key = %short(&cache_key),
                "fetched data but failed to record {} credit(s): {}",
                credits,
                e
            );
            FetchError::Storage(e)
        })?;
        drop(reservation);
        tracing::info!(credits, total_today = total, "credits used");

        let entry = CacheEntry {
            key: cache_key.clone(),
            fetched_at: Utc::now(),
            ttl_minutes,
            request_descriptor: descriptor.canonical_json()?,
            response_payload: response.body,
        };
        if let Err(e) = self.cache.put(&entry) {
            tracing::warn!(cache_key = %short(&cache_key), "cache write failed: {}", e);
        }

        Ok(RawResponse {
            body: entry.response_payload,
            cache_key,
            source: ResponseSource::Network,
            credits_charged: credits,
        })
    }

    async fn get_with_retry(
        &self,
        descriptor: &RequestDescriptor,
        cache_key: &str,
    ) -> Result<oddsapi::RawResponse, FetchError> {
        let RetryPolicy { attempts, delay } = self.settings.retry;
        let attempts = attempts.max(1);
        let params = descriptor.to_query_pairs();

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.client.get_raw(descriptor.endpoint(), &params).await {
                Ok(resp) => return Ok(resp),
                Err(err) => {
                    if attempt >= attempts {
                        tracing::error!(
                            cache_key = %short(cache_key),
                            "upstream request failed after {} attempt(s): {}",
                            attempts,
                            err
                        );
                        return Err(FetchError::Upstream {
                            attempts,
                            source: err,
                        });
                    }
                    tracing::warn!(
                        cache_key = %short(cache_key),
                        "upstream request failed (attempt {}/{}), retrying in {:.1}s: {}",
                        attempt,
                        attempts,
                        delay.as_secs_f64(),
                        err
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Credits consumed by a successful call: the first configured header that
/// parses as an integer, else 1.
fn credits_for(response: &oddsapi::RawResponse, cost_headers: &[String]) -> u64 {
    cost_headers
        .iter()
        .find_map(|name| response.header(name).and_then(|v| v.trim().parse::<u64>().ok()))
        .unwrap_or(1)
}

fn short(key: &str) -> &str {
    key.get(..12).unwrap_or(key)
}
