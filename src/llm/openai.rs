//! OpenAI-compatible chat completion client.
//!
//! Speaks the `chat/completions` wire shape shared by Groq, OpenAI, and most
//! self-hosted gateways; the deployment is chosen via the base URL.

use super::{CompletionRequest, LlmProvider};
use crate::config::LlmConfig;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI-compatible LLM client.
pub struct OpenAiCompatClient {
    /// API key.
    api_key: Option<SecretString>,
    /// API endpoint.
    endpoint: String,
    /// Model to use.
    model: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl OpenAiCompatClient {
    /// Default API endpoint (Groq's OpenAI-compatible gateway).
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.groq.com/openai/v1";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "llama-3.3-70b-versatile";

    /// Creates a new client with defaults, reading `GROQ_API_KEY` from the
    /// environment.
    #[must_use]
    pub fn new() -> Self {
        let api_key = std::env::var("GROQ_API_KEY").ok().map(SecretString::from);
        Self {
            api_key,
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            client: build_http_client(30_000),
        }
    }

    /// Creates a client from configuration.
    #[must_use]
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            endpoint: config.base_url.clone(),
            model: config.model.clone(),
            client: build_http_client(config.timeout_ms),
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Makes a request to the chat-completions API.
    fn request(&self, request: &CompletionRequest) -> Result<String> {
        let api_key = self.api_key.as_ref().ok_or_else(|| Error::OperationFailed {
            operation: "llm_complete".to_string(),
            cause: "API key not configured".to_string(),
        })?;

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.user.clone(),
        });

        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .header("Authorization", format!("Bearer {}", api_key.expose_secret()))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .map_err(|e| Error::OperationFailed {
                operation: "llm_complete".to_string(),
                cause: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().unwrap_or_default();
            return Err(Error::OperationFailed {
                operation: "llm_complete".to_string(),
                cause: format!("API returned {status}: {text}"),
            });
        }

        let completion: ChatCompletionResponse =
            response.json().map_err(|e| Error::OperationFailed {
                operation: "llm_complete".to_string(),
                cause: format!("invalid response body: {e}"),
            })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::OperationFailed {
                operation: "llm_complete".to_string(),
                cause: "response contained no choices".to_string(),
            })
    }
}

impl Default for OpenAiCompatClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for OpenAiCompatClient {
    fn name(&self) -> &'static str {
        "openai_compat"
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.request(request)
    }
}

/// Builds a blocking HTTP client with the configured timeout.
fn build_http_client(timeout_ms: u64) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder();
    if timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(timeout_ms));
    }
    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build LLM HTTP client: {err}");
        reqwest::blocking::Client::new()
    })
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
