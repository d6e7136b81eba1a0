//! HTTP client for The Odds API (v4).

use std::time::Duration;

use reqwest::header::HeaderMap;
use url::Url;

use crate::Error;

/// Default per-attempt timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Query parameter carrying the API key. Never part of a cached request.
pub const API_KEY_PARAM: &str = "apiKey";

/// HTTP client for The Odds API.
///
/// Performs exactly one GET per call. Retries, caching and quota accounting
/// belong to the caller. Each request builds a fresh `reqwest::Client` with
/// the configured timeout.
pub struct Client {
    /// Base URL for the API. Defaults to `https://api.the-odds-api.com`.
    base_api_url: String,
    api_key: String,
    timeout: Duration,
}

/// A successful (2xx) upstream response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    /// Returns a header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl Client {
    /// Creates a new client pointing at the production API.
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url("https://api.the-odds-api.com", api_key)
    }

    /// Creates a new client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, api_key: &str) -> Self {
        Self {
            base_api_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the timeout applied to every request attempt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn get_url(&self, path: &str, params: &[(String, String)]) -> Result<Url, Error> {
        let mut url = Url::parse(format!("{}{}", &self.base_api_url, path).as_str())
            .map_err(|e| {
                tracing::error!("Invalid URL constructed: {}", e);
                Error::RequestFailed(format!("invalid url: {}", e))
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in params {
                pairs.append_pair(name, value);
            }
            pairs.append_pair(API_KEY_PARAM, &self.api_key);
        }
        Ok(url)
    }

    /// Issues one GET request for `path` with the given query parameters.
    ///
    /// The API key is appended here and never logged. Non-2xx responses are
    /// returned as [`Error::HttpStatus`].
    pub async fn get_raw(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<RawResponse, Error> {
        let url = self.get_url(path, params)?;
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed(e.to_string())
            })?;
        let resp = client
            .get(url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                tracing::debug!("Failed to get {}: {}", path, e);
                Error::RequestFailed(e.to_string())
            })?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text().await.map_err(|e| {
            let e = e.without_url();
            tracing::debug!("Failed to read response body: {}", e);
            Error::RequestFailed(e.to_string())
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::debug!("Request to {} failed with status {}: {}", path, status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        Ok(RawResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}
