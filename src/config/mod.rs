//! Configuration management.
//!
//! Typed configuration with a TOML file mirror and environment-variable
//! overrides. Validation happens once at construction; pipeline stages never
//! re-validate at runtime.

use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration for confidant.
#[derive(Debug, Clone, Default)]
pub struct ConfidantConfig {
    /// Text-generation oracle configuration.
    pub llm: LlmConfig,
    /// Embedding oracle configuration.
    pub embedding: EmbeddingConfig,
    /// Persistence configuration.
    pub storage: StorageConfig,
    /// Confidence scoring configuration.
    pub confidence: ConfidenceConfig,
}

/// Text-generation oracle configuration.
///
/// The client speaks the OpenAI chat-completions wire shape, which covers
/// Groq, OpenAI, and self-hosted gateways via `base_url`.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of the chat-completions endpoint.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// API key.
    pub api_key: Option<SecretString>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum retries for transient failures.
    pub max_retries: u32,
    /// Initial retry backoff in milliseconds.
    pub retry_initial_delay_ms: u64,
    /// Backoff multiplier applied per retry.
    pub retry_multiplier: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: None,
            timeout_ms: 30_000,
            max_retries: 2,
            retry_initial_delay_ms: 1_000,
            retry_multiplier: 2.0,
        }
    }
}

/// Embedding oracle configuration.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Feature-extraction endpoint base URL.
    pub base_url: String,
    /// Embedding model name.
    pub model: String,
    /// API token.
    pub api_token: Option<SecretString>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.huggingface.co/hf-inference/models".to_string(),
            model: "BAAI/bge-small-en-v1.5".to_string(),
            api_token: None,
            timeout_ms: 30_000,
        }
    }
}

/// Persistence configuration: snapshot store and vector index.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Path of the JSON snapshot file.
    pub snapshot_path: PathBuf,
    /// Vector index base URL.
    pub index_url: String,
    /// Vector index API key (cloud deployments).
    pub index_api_key: Option<SecretString>,
    /// Collection name for memory points.
    pub collection: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(".confidant/memory.json"),
            index_url: "http://localhost:6333".to_string(),
            index_api_key: None,
            collection: "user_memory".to_string(),
        }
    }
}

/// Confidence scoring configuration.
///
/// Keyword lists are data, not code, so scoring behavior is tunable without
/// touching control flow.
#[derive(Debug, Clone)]
pub struct ConfidenceConfig {
    /// Score at or above which the label is `High`.
    pub high_threshold: f32,
    /// Score at or above which the label is `Medium`.
    pub medium_threshold: f32,
    /// Absolute/superlative markers that boost the score by 0.3.
    pub intensifiers: Vec<String>,
    /// Habitual markers that boost the score by 0.2.
    pub frequency_terms: Vec<String>,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            high_threshold: 0.75,
            medium_threshold: 0.40,
            intensifiers: ["always", "really", "definitely", "absolutely", "love", "hate"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            frequency_terms: ["usually", "often", "typically", "tend to"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl ConfidenceConfig {
    /// Validates threshold ordering and bounds.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] when
    /// `high_threshold <= medium_threshold` or either threshold leaves
    /// `[0, 1]`. Called once at startup, never mid-pipeline.
    pub fn validate(&self) -> crate::Result<()> {
        if !(0.0..=1.0).contains(&self.high_threshold)
            || !(0.0..=1.0).contains(&self.medium_threshold)
        {
            return Err(crate::Error::Configuration(format!(
                "confidence thresholds must be within [0, 1], got high={} medium={}",
                self.high_threshold, self.medium_threshold
            )));
        }
        if self.high_threshold <= self.medium_threshold {
            return Err(crate::Error::Configuration(format!(
                "high_threshold ({}) must exceed medium_threshold ({})",
                self.high_threshold, self.medium_threshold
            )));
        }
        Ok(())
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// LLM section.
    pub llm: Option<ConfigFileLlm>,
    /// Embedding section.
    pub embedding: Option<ConfigFileEmbedding>,
    /// Storage section.
    pub storage: Option<ConfigFileStorage>,
    /// Confidence section.
    pub confidence: Option<ConfigFileConfidence>,
}

/// LLM section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLlm {
    /// Base URL.
    pub base_url: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Maximum retries.
    pub max_retries: Option<u32>,
    /// Initial retry backoff in milliseconds.
    pub retry_initial_delay_ms: Option<u64>,
    /// Backoff multiplier.
    pub retry_multiplier: Option<f64>,
}

/// Embedding section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileEmbedding {
    /// Base URL.
    pub base_url: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// API token.
    pub api_token: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

/// Storage section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileStorage {
    /// Snapshot file path.
    pub snapshot_path: Option<String>,
    /// Vector index URL.
    pub index_url: Option<String>,
    /// Vector index API key.
    pub index_api_key: Option<String>,
    /// Collection name.
    pub collection: Option<String>,
}

/// Confidence section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileConfidence {
    /// High threshold.
    pub high_threshold: Option<f32>,
    /// Medium threshold.
    pub medium_threshold: Option<f32>,
    /// Intensifier markers.
    pub intensifiers: Option<Vec<String>>,
    /// Frequency markers.
    pub frequency_terms: Option<Vec<String>>,
}

impl ConfidantConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting confidence thresholds are invalid.
    pub fn load_from_file(path: &std::path::Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: e.to_string(),
            })?;

        let file: ConfigFile =
            toml::from_str(&contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        let config = Self::from_config_file(file);
        config.confidence.validate()?;
        Ok(config)
    }

    /// Builds a configuration from a parsed config file, filling gaps with
    /// defaults.
    #[must_use]
    pub fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(llm) = file.llm {
            if let Some(base_url) = llm.base_url {
                config.llm.base_url = base_url;
            }
            if let Some(model) = llm.model {
                config.llm.model = model;
            }
            if let Some(api_key) = llm.api_key {
                config.llm.api_key = Some(SecretString::from(api_key));
            }
            if let Some(timeout_ms) = llm.timeout_ms {
                config.llm.timeout_ms = timeout_ms;
            }
            if let Some(max_retries) = llm.max_retries {
                config.llm.max_retries = max_retries;
            }
            if let Some(delay) = llm.retry_initial_delay_ms {
                config.llm.retry_initial_delay_ms = delay;
            }
            if let Some(multiplier) = llm.retry_multiplier {
                config.llm.retry_multiplier = multiplier.max(1.0);
            }
        }

        if let Some(embedding) = file.embedding {
            if let Some(base_url) = embedding.base_url {
                config.embedding.base_url = base_url;
            }
            if let Some(model) = embedding.model {
                config.embedding.model = model;
            }
            if let Some(api_token) = embedding.api_token {
                config.embedding.api_token = Some(SecretString::from(api_token));
            }
            if let Some(timeout_ms) = embedding.timeout_ms {
                config.embedding.timeout_ms = timeout_ms;
            }
        }

        if let Some(storage) = file.storage {
            if let Some(path) = storage.snapshot_path {
                config.storage.snapshot_path = PathBuf::from(path);
            }
            if let Some(url) = storage.index_url {
                config.storage.index_url = url;
            }
            if let Some(key) = storage.index_api_key {
                config.storage.index_api_key = Some(SecretString::from(key));
            }
            if let Some(collection) = storage.collection {
                config.storage.collection = collection;
            }
        }

        if let Some(confidence) = file.confidence {
            if let Some(high) = confidence.high_threshold {
                config.confidence.high_threshold = high;
            }
            if let Some(medium) = confidence.medium_threshold {
                config.confidence.medium_threshold = medium;
            }
            if let Some(intensifiers) = confidence.intensifiers {
                config.confidence.intensifiers = intensifiers;
            }
            if let Some(frequency_terms) = confidence.frequency_terms {
                config.confidence.frequency_terms = frequency_terms;
            }
        }

        config
    }

    /// Applies environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("CONFIDANT_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("CONFIDANT_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("GROQ_API_KEY") {
            self.llm.api_key = Some(SecretString::from(v));
        }
        if let Ok(v) = std::env::var("CONFIDANT_LLM_TIMEOUT_MS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.llm.timeout_ms = parsed;
            }
        }
        if let Ok(v) = std::env::var("CONFIDANT_LLM_MAX_RETRIES") {
            if let Ok(parsed) = v.parse::<u32>() {
                self.llm.max_retries = parsed;
            }
        }
        if let Ok(v) = std::env::var("HF_API_TOKEN") {
            self.embedding.api_token = Some(SecretString::from(v));
        }
        if let Ok(v) = std::env::var("CONFIDANT_SNAPSHOT_PATH") {
            self.storage.snapshot_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("CONFIDANT_INDEX_URL") {
            self.storage.index_url = v;
        }
        if let Ok(v) = std::env::var("QDRANT_API_KEY") {
            self.storage.index_api_key = Some(SecretString::from(v));
        }
        if let Ok(v) = std::env::var("CONFIDANT_COLLECTION") {
            self.storage.collection = v;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_valid() {
        assert!(ConfidenceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let config = ConfidenceConfig {
            high_threshold: 0.3,
            medium_threshold: 0.6,
            ..ConfidenceConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, crate::Error::Configuration(_)));
    }

    #[test]
    fn test_equal_thresholds_rejected() {
        let config = ConfidenceConfig {
            high_threshold: 0.5,
            medium_threshold: 0.5,
            ..ConfidenceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_thresholds_rejected() {
        let config = ConfidenceConfig {
            high_threshold: 1.5,
            medium_threshold: 0.4,
            ..ConfidenceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_config_file_overrides() {
        let file: ConfigFile = toml::from_str(
            r#"
            [llm]
            model = "llama-3.1-8b-instant"
            max_retries = 4

            [confidence]
            high_threshold = 0.8
            "#,
        )
        .unwrap();
        let config = ConfidantConfig::from_config_file(file);
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.llm.max_retries, 4);
        assert!((config.confidence.high_threshold - 0.8).abs() < f32::EPSILON);
        // Untouched sections keep defaults.
        assert_eq!(config.storage.collection, "user_memory");
    }
}
