//! Heuristic confidence scoring.
//!
//! Each item gets a bounded numeric score from linguistic markers and
//! literal evidence in the source messages, then a qualitative label via two
//! configurable thresholds. The keyword lists are configuration data, not
//! code; see [`ConfidenceConfig`].

use crate::config::ConfidenceConfig;
use crate::models::{ConfidenceLabel, MemoryItem, MemoryOutput};
use crate::Result;

/// Base score before any boost.
const BASE_SCORE: f32 = 0.4;
/// Boost for intensifier markers.
const INTENSIFIER_BOOST: f32 = 0.3;
/// Boost for frequency markers.
const FREQUENCY_BOOST: f32 = 0.2;

/// Scores memory items against their source messages.
pub struct ConfidenceScorer {
    config: ConfidenceConfig,
}

impl ConfidenceScorer {
    /// Creates a scorer, validating the threshold configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] for inverted or out-of-range
    /// thresholds. Validation happens here, once, so scoring itself cannot
    /// fail.
    pub fn new(config: ConfidenceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Populates confidence labels on every item in `output`.
    ///
    /// Same items in, same items out; only the labels change.
    #[must_use]
    pub fn score(&self, mut output: MemoryOutput, messages: &[String]) -> MemoryOutput {
        for item in output
            .preferences
            .iter_mut()
            .chain(output.patterns.iter_mut())
            .chain(output.facts.iter_mut())
        {
            let score = self.raw_score(item, messages);
            item.confidence = self.label_for(score);
        }
        output
    }

    /// Computes the bounded numeric score for one item.
    #[must_use]
    pub fn raw_score(&self, item: &MemoryItem, messages: &[String]) -> f32 {
        let text = item.content.to_lowercase();
        let mut score = BASE_SCORE;

        if self.config.intensifiers.iter().any(|w| text.contains(w.as_str())) {
            score += INTENSIFIER_BOOST;
        }
        if self.config.frequency_terms.iter().any(|w| text.contains(w.as_str())) {
            score += FREQUENCY_BOOST;
        }

        // Literal substring containment of the item content in the sources.
        let matches = messages
            .iter()
            .filter(|m| m.to_lowercase().contains(&text))
            .count();
        if matches >= 3 {
            score += 0.2;
        } else if matches == 2 {
            score += 0.1;
        }

        score.clamp(0.0, 1.0)
    }

    /// Maps a numeric score to a qualitative label.
    ///
    /// Monotonic by construction: `high_threshold > medium_threshold` is
    /// enforced at startup.
    #[must_use]
    pub fn label_for(&self, score: f32) -> ConfidenceLabel {
        if score >= self.config.high_threshold {
            ConfidenceLabel::High
        } else if score >= self.config.medium_threshold {
            ConfidenceLabel::Medium
        } else {
            ConfidenceLabel::Low
        }
    }
}
