//! Emotional state types.
//!
//! Ephemeral per-message signal consumed by the persona selector.
//! Never persisted and never mutated after creation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse sentiment polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Positive polarity.
    Positive,
    /// Negative polarity.
    Negative,
    /// Neutral polarity.
    #[default]
    Neutral,
}

impl Sentiment {
    /// Parses a sentiment string, defaulting to `Neutral` for unknown values.
    #[must_use]
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "positive" => Self::Positive,
            "negative" => Self::Negative,
            _ => Self::Neutral,
        }
    }

    /// Returns the sentiment as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Simplified emotional state, derived from sentiment and emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateKind {
    /// Negative sentiment with fear/anxiety/sadness.
    Stressed,
    /// Negative sentiment with anger.
    Frustrated,
    /// Positive sentiment with joy.
    Excited,
    /// No notable signal.
    #[default]
    Neutral,
    /// Anything that fits no other bucket.
    Mixed,
}

impl StateKind {
    /// Parses a state string, defaulting to `Mixed` for unknown non-empty
    /// values and `Neutral` for blank input.
    #[must_use]
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "stressed" => Self::Stressed,
            "frustrated" => Self::Frustrated,
            "excited" => Self::Excited,
            "neutral" | "" => Self::Neutral,
            _ => Self::Mixed,
        }
    }

    /// Returns the state as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stressed => "stressed",
            Self::Frustrated => "frustrated",
            Self::Excited => "excited",
            Self::Neutral => "neutral",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The emotion labels the estimator normalizes oracle output into.
const KNOWN_EMOTIONS: &[&str] = &["joy", "fear", "anger", "sadness", "anxiety", "neutral"];

/// Normalizes an open-ended emotion label to the known set.
///
/// Unknown labels fall back to `"neutral"` so downstream rules stay closed.
#[must_use]
pub(crate) fn normalize_emotion(label: &str) -> String {
    let lower = label.trim().to_lowercase();
    if KNOWN_EMOTIONS.contains(&lower.as_str()) {
        lower
    } else {
        "neutral".to_string()
    }
}

/// Inferred emotional state for a single inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalState {
    /// Simplified state bucket.
    pub state: StateKind,
    /// Sentiment polarity.
    pub sentiment: Sentiment,
    /// Emotion label, normalized to the known set.
    pub emotion: String,
    /// Classifier confidence in `[0, 1]`.
    pub confidence: f32,
}

impl EmotionalState {
    /// The neutral state with zero confidence.
    ///
    /// Returned for blank input and whenever estimation fails.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            state: StateKind::Neutral,
            sentiment: Sentiment::Neutral,
            emotion: "neutral".to_string(),
            confidence: 0.0,
        }
    }
}

impl Default for EmotionalState {
    fn default() -> Self {
        Self::neutral()
    }
}
