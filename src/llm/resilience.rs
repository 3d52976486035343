//! Retry wrapper for LLM calls with backoff and request instrumentation.

use super::{CompletionRequest, LlmProvider};
use crate::config::LlmConfig;
use crate::Result;
use std::time::{Duration, Instant};

/// Bounded retry policy with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries for transient failures.
    pub max_retries: u32,
    /// Backoff before the first retry in milliseconds.
    pub initial_delay_ms: u64,
    /// Multiplier applied to the delay per retry.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 1_000,
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Loads the retry policy from LLM configuration.
    #[must_use]
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay_ms: config.retry_initial_delay_ms,
            multiplier: config.retry_multiplier.max(1.0),
        }
    }
}

/// LLM provider wrapper that retries transient failures.
///
/// Every failure is treated as potentially transient; the final failure
/// after exhausting retries is surfaced to the caller as a terminal error,
/// never swallowed.
pub struct RetryingProvider<P: LlmProvider> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: LlmProvider> RetryingProvider<P> {
    /// Wraps a provider with the given retry policy.
    #[must_use]
    pub const fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Returns a reference to the wrapped provider.
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    fn execute(&self, request: &CompletionRequest) -> Result<String> {
        let provider: &'static str = self.inner.name();
        let span = tracing::info_span!(
            "llm.request",
            provider = provider,
            status = tracing::field::Empty,
            error = tracing::field::Empty
        );
        let _enter = span.enter();

        let max_attempts = self.policy.max_retries + 1;
        let mut delay_ms = self.policy.initial_delay_ms;
        let mut attempts = 0;

        loop {
            attempts += 1;
            let attempt_start = Instant::now();
            let result = self.inner.complete(request);
            let elapsed = attempt_start.elapsed();

            match result {
                Ok(value) => {
                    record_request(provider, "success", elapsed);
                    span.record("status", "success");
                    return Ok(value);
                },
                Err(err) => {
                    record_request(provider, "error", elapsed);
                    span.record("status", "error");
                    span.record("error", tracing::field::display(&err));

                    if attempts >= max_attempts {
                        tracing::error!(
                            "LLM call failed after {attempts} attempts (provider={provider}): {err}"
                        );
                        return Err(err);
                    }

                    metrics::counter!("llm_retries_total", "provider" => provider).increment(1);
                    tracing::warn!(
                        "LLM call attempt {attempts}/{max_attempts} failed (provider={provider}): \
                         {err}. Retrying in {delay_ms}ms"
                    );
                    if delay_ms > 0 {
                        std::thread::sleep(Duration::from_millis(delay_ms));
                    }
                    delay_ms = apply_multiplier(delay_ms, self.policy.multiplier);
                },
            }
        }
    }
}

impl<P: LlmProvider> LlmProvider for RetryingProvider<P> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.execute(request)
    }
}

fn record_request(provider: &'static str, status: &'static str, elapsed: Duration) {
    metrics::counter!(
        "llm_requests_total",
        "provider" => provider,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "llm_request_duration_ms",
        "provider" => provider,
        "status" => status
    )
    .record(elapsed.as_secs_f64() * 1000.0);
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn apply_multiplier(delay_ms: u64, multiplier: f64) -> u64 {
    (delay_ms as f64 * multiplier).round() as u64
}
