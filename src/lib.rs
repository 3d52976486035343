//! # Confidant
//!
//! Memory and persona response pipeline for a long-term companion assistant.
//!
//! Confidant turns raw user messages into durable, structured memory
//! (preferences, behavioral patterns, facts), retrieves relevant memory via
//! semantic search, and produces replies whose tone is adapted to the user's
//! inferred emotional state.
//!
//! ## Architecture
//!
//! - LLM gateway with bounded retry and structured-output recovery
//! - Heuristic confidence scoring and per-bucket deduplication
//! - Dual persistence: JSON snapshot store + vector index
//! - Rule-based persona selection with LLM-driven tone rewriting
//!
//! ## Example
//!
//! ```rust,ignore
//! use confidant::pipeline::ResponsePipeline;
//!
//! let pipeline = ResponsePipeline::new(llm, embedder, snapshots, index);
//! let trace = pipeline.run("I got the job!", None, 5)?;
//! println!("{}", trace.final_reply);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod embedding;
pub mod emotion;
pub mod llm;
pub mod memory;
pub mod models;
pub mod observability;
pub mod persona;
pub mod pipeline;
pub mod storage;

// Re-exports for convenience
pub use config::{ConfidantConfig, ConfidenceConfig, EmbeddingConfig, LlmConfig, StorageConfig};
pub use embedding::Embedder;
pub use llm::{CompletionRequest, LlmProvider};
pub use models::{
    ConfidenceLabel, EmotionalState, MemoryItem, MemoryKind, MemoryOutput, Sentiment, StateKind,
    UserStats,
};
pub use persona::{PersonaName, PersonaProfile, PersonaSelection};
pub use pipeline::{MemoryPipeline, PipelineTrace, ResponsePipeline};
pub use storage::{SnapshotStore, VectorIndex};

/// Error type for confidant operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Missing required parameters, empty prompts |
/// | `OperationFailed` | Oracle/network calls fail, store I/O fails |
/// | `InvalidStructuredOutput` | The oracle response survives no JSON recovery strategy |
/// | `Configuration` | Inverted confidence thresholds, out-of-range settings |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - Required parameters are missing (e.g., empty user prompt)
    /// - A requested persona name is unknown
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - An oracle HTTP request fails or times out after retries
    /// - Snapshot store I/O fails
    /// - Vector index requests fail
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// The oracle did not return valid structured output.
    ///
    /// Raised only after all three recovery strategies (direct parse, fenced
    /// code block, first-to-last brace) have failed. Kept distinct from
    /// [`Error::OperationFailed`] so systematic prompt regressions are never
    /// masked by a default value.
    #[error("invalid structured output from '{operation}': {cause}")]
    InvalidStructuredOutput {
        /// The operation whose response could not be parsed.
        operation: String,
        /// The underlying parse failure.
        cause: String,
    },

    /// Configuration is invalid.
    ///
    /// Raised at startup validation, never mid-pipeline:
    /// - `high_threshold <= medium_threshold`
    /// - Thresholds outside `[0, 1]`
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for confidant operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("empty message".to_string());
        assert_eq!(err.to_string(), "invalid input: empty message");

        let err = Error::OperationFailed {
            operation: "llm_complete".to_string(),
            cause: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "operation 'llm_complete' failed: connection refused"
        );

        let err = Error::InvalidStructuredOutput {
            operation: "extract_memory".to_string(),
            cause: "no JSON object found".to_string(),
        };
        assert!(err.to_string().contains("invalid structured output"));
        assert!(err.to_string().contains("extract_memory"));

        let err = Error::Configuration("high_threshold must exceed medium_threshold".to_string());
        assert!(err.to_string().starts_with("configuration error"));
    }
}
