//! Qdrant vector index over the REST API.
//!
//! Talks plain HTTP to a Qdrant instance: create-collection-if-absent with
//! cosine distance, point upsert, and top-k search. Dimensionality is
//! whatever the first `ensure_collection` call discovers from real
//! embeddings, never configured up front.

use super::{MemoryPointPayload, ScoredPoint, VectorIndex, VectorPoint};
use crate::config::StorageConfig;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// [`VectorIndex`] backed by a Qdrant collection.
pub struct QdrantIndex {
    base_url: String,
    collection: String,
    api_key: Option<SecretString>,
    client: reqwest::blocking::Client,
}

impl QdrantIndex {
    /// Creates an index for `collection` at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
            api_key: None,
            client,
        })
    }

    /// Creates an index from storage configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let mut index = Self::new(&config.index_url, &config.collection)?;
        index.api_key.clone_from(&config.index_api_key);
        Ok(index)
    }

    /// Sets the API key sent in the `api-key` header.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// Returns the collection name.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> reqwest::blocking::RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let mut builder = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            builder = builder.header("api-key", key.expose_secret());
        }
        builder
    }

    fn send(
        &self,
        operation: &str,
        builder: reqwest::blocking::RequestBuilder,
    ) -> Result<reqwest::blocking::Response> {
        let response = builder.send().map_err(|e| Error::OperationFailed {
            operation: operation.to_string(),
            cause: format!("request failed: {e}"),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        Err(Error::OperationFailed {
            operation: operation.to_string(),
            cause: format!("HTTP {status}: {body}"),
        })
    }

    fn collection_exists(&self) -> Result<bool> {
        let path = format!("/collections/{}", self.collection);
        let response = self
            .request(reqwest::Method::GET, &path)
            .send()
            .map_err(|e| Error::OperationFailed {
                operation: "index_collection_check".to_string(),
                cause: format!("request failed: {e}"),
            })?;

        match response.status() {
            status if status.is_success() => Ok(true),
            reqwest::StatusCode::NOT_FOUND => Ok(false),
            status => {
                let body = response.text().unwrap_or_default();
                Err(Error::OperationFailed {
                    operation: "index_collection_check".to_string(),
                    cause: format!("HTTP {status}: {body}"),
                })
            }
        }
    }
}

impl VectorIndex for QdrantIndex {
    fn ensure_collection(&self, dimensions: usize) -> Result<()> {
        if self.collection_exists()? {
            return Ok(());
        }

        tracing::info!(
            collection = %self.collection,
            dimensions,
            "Creating vector collection"
        );

        let path = format!("/collections/{}", self.collection);
        let body = json!({
            "vectors": {
                "size": dimensions,
                "distance": "Cosine",
            }
        });
        self.send(
            "index_collection_create",
            self.request(reqwest::Method::PUT, &path).json(&body),
        )?;
        Ok(())
    }

    fn upsert(&self, points: Vec<VectorPoint>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let count = points.len();
        let path = format!("/collections/{}/points?wait=true", self.collection);
        let body = json!({ "points": points });
        self.send(
            "index_upsert",
            self.request(reqwest::Method::PUT, &path).json(&body),
        )?;

        tracing::debug!(collection = %self.collection, count, "Upserted vector points");
        metrics::counter!("index_points_upserted_total").increment(count as u64);
        Ok(())
    }

    fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>> {
        let path = format!("/collections/{}/points/search", self.collection);
        let body = json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });
        let response = self.send(
            "index_search",
            self.request(reqwest::Method::POST, &path).json(&body),
        )?;

        let parsed: SearchResponse = response.json().map_err(|e| Error::OperationFailed {
            operation: "index_search".to_string(),
            cause: format!("invalid response body: {e}"),
        })?;

        Ok(parsed
            .result
            .into_iter()
            .map(|hit| {
                let payload = hit.payload.and_then(|value| {
                    match serde_json::from_value::<MemoryPointPayload>(value) {
                        Ok(payload) => Some(payload),
                        Err(e) => {
                            tracing::warn!(error = %e, "Skipping point with unreadable payload");
                            None
                        }
                    }
                });
                ScoredPoint {
                    score: hit.score,
                    payload,
                }
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    score: f32,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}
