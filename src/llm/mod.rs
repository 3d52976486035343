//! Text-generation gateway.
//!
//! Provides a unified generate / structured-generate contract over external
//! text-generation oracles, with bounded retry and JSON recovery layered on
//! top of a single provider trait.

mod openai;
mod resilience;
mod structured;

pub use openai::OpenAiCompatClient;
pub use resilience::{RetryPolicy, RetryingProvider};
pub use structured::{structured_generate, structured_generate_as};

use crate::Result;

/// One completion request to the text-generation oracle.
///
/// The transport timeout lives in client configuration, not on the request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Optional system behavior instructions.
    pub system: Option<String>,
    /// The user's message or main prompt.
    pub user: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens for the response.
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Creates a request with the given prompts at moderate temperature.
    #[must_use]
    pub const fn new(system: Option<String>, user: String) -> Self {
        Self {
            system,
            user,
            temperature: 0.7,
            max_tokens: 512,
        }
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the token budget.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Trait for text-generation providers.
///
/// Implementations own no state across calls beyond configuration; each call
/// is independent and idempotent from the caller's point of view, though the
/// oracle itself may be non-deterministic.
pub trait LlmProvider: Send + Sync {
    /// The provider name.
    fn name(&self) -> &'static str;

    /// Generates a completion for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion fails.
    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

impl<P: LlmProvider + ?Sized> LlmProvider for std::sync::Arc<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (**self).complete(request)
    }
}

impl<P: LlmProvider + ?Sized> LlmProvider for &P {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (**self).complete(request)
    }
}
