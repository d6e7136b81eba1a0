//! Request descriptors and their stable cache keys.

use std::collections::BTreeMap;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::FetchError;

/// Value of one request parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    /// Sent comma-joined. Element order is not significant.
    List(Vec<String>),
}

impl ParamValue {
    fn to_wire(&self) -> String {
        match self {
            ParamValue::Text(v) => v.clone(),
            ParamValue::List(vs) => vs.join(","),
        }
    }
}

/// One logical upstream query: an endpoint path plus named parameters.
///
/// Parameter names are kept sorted, so insertion order never affects the
/// fingerprint. The API key is not a descriptor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestDescriptor {
    endpoint: String,
    params: BTreeMap<String, ParamValue>,
}

impl RequestDescriptor {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .insert(name.into(), ParamValue::Text(value.into()));
        self
    }

    pub fn with_list<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.params.insert(name.into(), ParamValue::List(values));
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn params(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }

    pub fn validate(&self) -> Result<(), FetchError> {
        if self.endpoint.is_empty() || !self.endpoint.starts_with('/') {
            return Err(FetchError::InvalidRequest(format!(
                "endpoint must be an absolute path, got '{}'",
                self.endpoint
            )));
        }
        if self.endpoint[1..]
            .split('/')
            .any(|segment| segment.trim().is_empty() || segment == "." || segment == "..")
        {
            return Err(FetchError::InvalidRequest(format!(
                "endpoint has an empty or relative path segment: '{}'",
                self.endpoint
            )));
        }
        for (name, value) in &self.params {
            if name.trim().is_empty() {
                return Err(FetchError::InvalidRequest(
                    "parameter name must not be empty".to_string(),
                ));
            }
            if name.eq_ignore_ascii_case(oddsapi::API_KEY_PARAM) {
                return Err(FetchError::InvalidRequest(format!(
                    "'{}' is supplied by the client, not the request",
                    name
                )));
            }
            if let ParamValue::List(values) = value {
                if values.is_empty() {
                    return Err(FetchError::InvalidRequest(format!(
                        "list parameter '{}' must not be empty",
                        name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Copy with every list parameter sorted.
    pub fn canonical(&self) -> RequestDescriptor {
        let params = self
            .params
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    ParamValue::List(values) => {
                        let mut values = values.clone();
                        values.sort();
                        ParamValue::List(values)
                    }
                    text => text.clone(),
                };
                (name.clone(), value)
            })
            .collect();
        RequestDescriptor {
            endpoint: self.endpoint.clone(),
            params,
        }
    }

    /// Deterministic JSON of the canonical form. Also stored alongside the
    /// cached response.
    pub fn canonical_json(&self) -> Result<String, FetchError> {
        self.validate()?;
        serde_json::to_string(&self.canonical())
            .map_err(|e| FetchError::InvalidRequest(format!("unserializable request: {}", e)))
    }

    /// Query pairs for the upstream call, in canonical order.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.canonical()
            .params
            .iter()
            .map(|(name, value)| (name.clone(), value.to_wire()))
            .collect()
    }
}

/// SHA-256 hex digest of the descriptor's canonical JSON.
pub fn fingerprint(descriptor: &RequestDescriptor) -> Result<String, FetchError> {
    let canonical = descriptor.canonical_json()?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
