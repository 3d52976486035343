//! Structured generation with JSON recovery.
//!
//! Oracles rarely return clean JSON on the first try. This module layers a
//! three-stage recovery strategy over [`LlmProvider::complete`], attempted in
//! order until one succeeds:
//!
//! 1. Parse the whole response directly.
//! 2. Extract and parse the interior of a fenced ```json block.
//! 3. Slice from the first `{` to the last `}` and parse that.
//!
//! If all three fail the caller gets [`crate::Error::InvalidStructuredOutput`].
//! This must never fail silently; downstream stages assume a well-typed
//! object, and coercing to a default would mask systematic prompt
//! regressions.

use super::{CompletionRequest, LlmProvider};
use crate::{Error, Result};
use serde::de::DeserializeOwned;

/// Generates a completion and parses it as a JSON value.
///
/// # Errors
///
/// Propagates the provider's terminal error, or returns
/// [`Error::InvalidStructuredOutput`] when no recovery strategy yields valid
/// JSON.
pub fn structured_generate<P: LlmProvider + ?Sized>(
    provider: &P,
    operation: &str,
    request: &CompletionRequest,
) -> Result<serde_json::Value> {
    let raw = provider.complete(request)?;

    // Strategy 1: direct parse.
    if let Ok(value) = serde_json::from_str(&raw) {
        return Ok(value);
    }
    tracing::debug!("Direct JSON parse failed for '{operation}', attempting recovery");

    // Strategy 2: fenced ```json block.
    if let Some(inner) = extract_fenced_json(&raw) {
        if let Ok(value) = serde_json::from_str(inner) {
            return Ok(value);
        }
    }

    // Strategy 3: first opening brace to last closing brace.
    if let Some(inner) = extract_braced(&raw) {
        if let Ok(value) = serde_json::from_str(inner) {
            return Ok(value);
        }
    }

    tracing::error!("All JSON recovery strategies failed for '{operation}'");
    tracing::debug!("Raw oracle output: {raw}");
    Err(Error::InvalidStructuredOutput {
        operation: operation.to_string(),
        cause: "oracle did not return valid JSON".to_string(),
    })
}

/// Generates a completion and deserializes it into `T`.
///
/// # Errors
///
/// As [`structured_generate`], plus [`Error::InvalidStructuredOutput`] when
/// the recovered JSON does not match the target shape.
pub fn structured_generate_as<T: DeserializeOwned, P: LlmProvider + ?Sized>(
    provider: &P,
    operation: &str,
    request: &CompletionRequest,
) -> Result<T> {
    let value = structured_generate(provider, operation, request)?;
    serde_json::from_value(value).map_err(|e| Error::InvalidStructuredOutput {
        operation: operation.to_string(),
        cause: format!("JSON does not match expected shape: {e}"),
    })
}

/// Extracts the interior of a ```json fenced block, if present.
fn extract_fenced_json(raw: &str) -> Option<&str> {
    let start = raw.find("```json")? + 7;
    let end = raw[start..].find("```")?;
    Some(raw[start..start + end].trim())
}

/// Slices from the first `{` to the last `}`, if both exist in order.
fn extract_braced(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Provider that returns a canned response.
    struct CannedProvider(String);

    impl LlmProvider for CannedProvider {
        fn name(&self) -> &'static str {
            "canned"
        }

        fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new(None, "test".to_string())
    }

    #[test]
    fn test_direct_parse() {
        let provider = CannedProvider(r#"{"a": 1}"#.to_string());
        let value = structured_generate(&provider, "test", &request()).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_fenced_block_recovery() {
        let provider = CannedProvider("Sure! ```json\n{\"a\":1}\n```".to_string());
        let value = structured_generate(&provider, "test", &request()).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_braced_substring_recovery() {
        let provider = CannedProvider("garbage {\"a\":1} trailing".to_string());
        let value = structured_generate(&provider, "test", &request()).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_no_json_is_terminal() {
        let provider = CannedProvider("no json here".to_string());
        let err = structured_generate(&provider, "test", &request()).unwrap_err();
        assert!(matches!(err, Error::InvalidStructuredOutput { .. }));
    }

    #[test]
    fn test_provider_error_propagates() {
        struct FailingProvider;
        impl LlmProvider for FailingProvider {
            fn name(&self) -> &'static str {
                "failing"
            }
            fn complete(&self, _request: &CompletionRequest) -> Result<String> {
                Err(Error::OperationFailed {
                    operation: "llm_complete".to_string(),
                    cause: "connection refused".to_string(),
                })
            }
        }
        let err = structured_generate(&FailingProvider, "test", &request()).unwrap_err();
        assert!(matches!(err, Error::OperationFailed { .. }));
    }

    #[test]
    fn test_typed_shape_mismatch() {
        #[derive(Debug, serde::Deserialize)]
        struct Expected {
            #[allow(dead_code)]
            name: String,
        }
        let provider = CannedProvider(r#"{"a": 1}"#.to_string());
        let err =
            structured_generate_as::<Expected, _>(&provider, "test", &request()).unwrap_err();
        assert!(matches!(err, Error::InvalidStructuredOutput { .. }));
    }
}
