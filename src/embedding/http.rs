//! HTTP embedding client for feature-extraction endpoints.
//!
//! Speaks the Hugging Face Inference API shape: POST a list of inputs,
//! receive one vector per input. A 3-D response (per-token embeddings) is
//! rejected rather than pooled locally; correctness beats convenience here.

use super::Embedder;
use crate::config::EmbeddingConfig;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::time::Duration;

/// Embedding client over a feature-extraction HTTP endpoint.
pub struct HttpEmbedder {
    /// Endpoint base URL.
    base_url: String,
    /// Model name, appended to the base URL.
    model: String,
    /// API token.
    api_token: Option<SecretString>,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl HttpEmbedder {
    /// Creates an embedder from configuration.
    #[must_use]
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        let mut builder = reqwest::blocking::Client::builder();
        if config.timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(config.timeout_ms));
        }
        let client = builder.build().unwrap_or_else(|err| {
            tracing::warn!("Failed to build embedding HTTP client: {err}");
            reqwest::blocking::Client::new()
        });

        Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_token: config.api_token.clone(),
            client,
        }
    }

    fn request(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let token = self.api_token.as_ref().ok_or_else(|| Error::OperationFailed {
            operation: "embed".to_string(),
            cause: "embedding API token not configured".to_string(),
        })?;

        let url = format!("{}/{}", self.base_url, self.model);
        let payload = json!({
            "inputs": texts,
            "options": { "wait_for_model": true },
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token.expose_secret()))
            .json(&payload)
            .send()
            .map_err(|e| Error::OperationFailed {
                operation: "embed".to_string(),
                cause: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().unwrap_or_default();
            return Err(Error::OperationFailed {
                operation: "embed".to_string(),
                cause: format!("API returned {status}: {text}"),
            });
        }

        let body: serde_json::Value = response.json().map_err(|e| Error::OperationFailed {
            operation: "embed".to_string(),
            cause: format!("invalid response body: {e}"),
        })?;

        let vectors = parse_batch_response(&body, texts.len())?;
        Ok(vectors)
    }
}

/// Validates that the response is a 2-D float array matching the batch size.
fn parse_batch_response(body: &serde_json::Value, expected: usize) -> Result<Vec<Vec<f32>>> {
    let outer = body.as_array().ok_or_else(|| malformed("response is not an array"))?;

    // A single input may come back as one flat vector.
    if expected == 1 && outer.first().is_some_and(serde_json::Value::is_number) {
        let vector = parse_vector(body)?;
        return Ok(vec![vector]);
    }

    if outer.len() != expected {
        return Err(malformed(&format!(
            "expected {expected} vectors, got {}",
            outer.len()
        )));
    }

    outer.iter().map(parse_vector).collect()
}

fn parse_vector(value: &serde_json::Value) -> Result<Vec<f32>> {
    let elements = value.as_array().ok_or_else(|| malformed("vector is not an array"))?;
    elements
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| {
                    #[allow(clippy::cast_possible_truncation)]
                    {
                        f as f32
                    }
                })
                .ok_or_else(|| malformed("vector element is not a number; token-level output?"))
        })
        .collect()
}

fn malformed(cause: &str) -> Error {
    Error::OperationFailed {
        operation: "embed".to_string(),
        cause: cause.to_string(),
    }
}

impl Embedder for HttpEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let mut vectors = self.request(&[text])?;
        vectors.pop().ok_or_else(|| malformed("empty embedding batch"))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts)
    }
}
