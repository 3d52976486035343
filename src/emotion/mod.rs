//! Emotional-state estimation.
//!
//! Maps raw text to a coarse sentiment/emotion/state tuple via one
//! structured oracle call. Estimation is an enhancement, not a requirement,
//! of producing a reply: every failure degrades to the neutral state.

use crate::llm::{CompletionRequest, LlmProvider, structured_generate};
use crate::models::{EmotionalState, Sentiment, StateKind, normalize_emotion};

const CLASSIFIER_SYSTEM_PROMPT: &str = r#"You are an expert emotion classifier.
Analyze the user's message and determine the emotional state.

Output strictly valid JSON with this schema:
{
    "state": "stressed" | "frustrated" | "excited" | "neutral" | "mixed",
    "sentiment": "positive" | "negative" | "neutral",
    "emotion": "joy" | "fear" | "anger" | "sadness" | "neutral" | "anxiety",
    "confidence": 0.0 to 1.0
}

CRITICAL RULES:
- If the user mentions a major positive life event (e.g., marriage proposal, promotion, new job, winning), classify as "excited" / "joy".
- Be sensitive to context and nuance.
"#;

/// Estimates a user's emotional state from a single message.
pub struct EmotionEstimator<P: LlmProvider> {
    llm: P,
}

impl<P: LlmProvider> EmotionEstimator<P> {
    /// Creates an estimator over the given provider.
    #[must_use]
    pub const fn new(llm: P) -> Self {
        Self { llm }
    }

    /// Estimates the emotional state of `text`.
    ///
    /// Blank input returns the neutral state without any oracle call. Any
    /// gateway failure also returns the neutral state; this method never
    /// errors.
    pub fn estimate(&self, text: &str) -> EmotionalState {
        if text.trim().is_empty() {
            return EmotionalState::neutral();
        }

        let user_prompt = format!("Classify this text:\n\"{text}\"\n\nReturn only the JSON object.");
        let request = CompletionRequest::new(Some(CLASSIFIER_SYSTEM_PROMPT.to_string()), user_prompt)
            .with_temperature(0.1)
            .with_max_tokens(128);

        match structured_generate(&self.llm, "estimate_emotion", &request) {
            Ok(value) => parse_state(&value),
            Err(err) => {
                tracing::warn!("Emotion estimation failed, degrading to neutral: {err}");
                EmotionalState::neutral()
            },
        }
    }
}

/// Normalizes the oracle's structured output into a closed-vocabulary state.
fn parse_state(value: &serde_json::Value) -> EmotionalState {
    let state = value
        .get("state")
        .and_then(serde_json::Value::as_str)
        .map_or(StateKind::Neutral, StateKind::parse_lossy);
    let sentiment = value
        .get("sentiment")
        .and_then(serde_json::Value::as_str)
        .map_or(Sentiment::Neutral, Sentiment::parse_lossy);
    let emotion = value
        .get("emotion")
        .and_then(serde_json::Value::as_str)
        .map_or_else(|| "neutral".to_string(), normalize_emotion);
    #[allow(clippy::cast_possible_truncation)]
    let confidence = value
        .get("confidence")
        .and_then(serde_json::Value::as_f64)
        .unwrap_or(0.0)
        .clamp(0.0, 1.0) as f32;

    EmotionalState {
        state,
        sentiment,
        emotion,
        confidence,
    }
}
