//! Memory item types and the extraction output container.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a memory item. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    /// Stable likes, dislikes, constraints.
    Preference,
    /// Behavioral or emotional patterns over time.
    Pattern,
    /// Concrete factual details worth remembering.
    Fact,
}

impl MemoryKind {
    /// Returns the kind as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preference => "preference",
            Self::Pattern => "pattern",
            Self::Fact => "fact",
        }
    }

    /// Parses a kind string, defaulting to `Fact` for unknown values.
    ///
    /// Used when reconstructing items from vector-index payloads, where an
    /// unknown kind must not abort retrieval.
    #[must_use]
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "preference" => Self::Preference,
            "pattern" => Self::Pattern,
            _ => Self::Fact,
        }
    }
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative confidence label, derived by the scorer.
///
/// Never authored directly by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLabel {
    /// Strong supporting signal.
    High,
    /// Moderate supporting signal.
    Medium,
    /// Weak supporting signal.
    Low,
}

impl ConfidenceLabel {
    /// Ordering rank used when merging duplicates: high > medium > low.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Parses a label string, defaulting to `Medium` for unknown values.
    #[must_use]
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }
}

impl fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalizes content for deduplication: trimmed, case-folded,
/// whitespace-collapsed.
#[must_use]
pub fn normalize_content(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// One extracted unit of memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    /// The memory kind.
    pub kind: MemoryKind,
    /// Natural-language payload. Non-empty after normalization.
    pub content: String,
    /// Indices into the source message list that support this item.
    /// Advisory only; never affects correctness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_indices: Option<Vec<usize>>,
    /// Qualitative confidence, populated by the scorer.
    pub confidence: ConfidenceLabel,
    /// Dense vector, attached only at indexing time. Not part of identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl MemoryItem {
    /// Creates an unscored item with the default `Medium` confidence.
    #[must_use]
    pub const fn new(kind: MemoryKind, content: String, evidence_indices: Option<Vec<usize>>) -> Self {
        Self {
            kind,
            content,
            evidence_indices,
            confidence: ConfidenceLabel::Medium,
            embedding: None,
        }
    }

    /// The uniqueness key: `(kind, normalized content)`.
    ///
    /// Two items with the same key are duplicates regardless of differing
    /// evidence or confidence.
    #[must_use]
    pub fn dedup_key(&self) -> (MemoryKind, String) {
        (self.kind, normalize_content(&self.content))
    }
}

/// Aggregate user signal stats, each bounded to `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    /// Anxiety level.
    #[serde(default)]
    pub anxiety: f32,
    /// Decision paralysis level.
    #[serde(default)]
    pub paralysis: f32,
    /// Optimism level.
    #[serde(default)]
    pub optimism: f32,
    /// Stress level.
    #[serde(default)]
    pub stress: f32,
}

impl UserStats {
    /// Returns a copy with every signal clamped to `[0, 100]`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            anxiety: self.anxiety.clamp(0.0, 100.0),
            paralysis: self.paralysis.clamp(0.0, 100.0),
            optimism: self.optimism.clamp(0.0, 100.0),
            stress: self.stress.clamp(0.0, 100.0),
        }
    }
}

/// Bundle of extracted memory: three buckets plus aggregate stats.
///
/// Created empty by extraction, mutated in place by the scoring and cleanup
/// stages, persisted once per pipeline run. The record store holds only the
/// latest snapshot; each run supersedes the previous one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryOutput {
    /// Stable likes/dislikes, constraints, and preferences.
    #[serde(default)]
    pub preferences: Vec<MemoryItem>,
    /// Behavioral or emotional patterns.
    #[serde(default)]
    pub patterns: Vec<MemoryItem>,
    /// Concrete facts worth remembering.
    #[serde(default)]
    pub facts: Vec<MemoryItem>,
    /// Aggregate user signal stats.
    #[serde(default)]
    pub stats: UserStats,
}

impl MemoryOutput {
    /// Flattens all buckets into one list, in bucket order
    /// (preferences, patterns, facts).
    #[must_use]
    pub fn all_items(&self) -> Vec<&MemoryItem> {
        self.preferences
            .iter()
            .chain(self.patterns.iter())
            .chain(self.facts.iter())
            .collect()
    }

    /// Total number of items across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.preferences.len() + self.patterns.len() + self.facts.len()
    }

    /// Returns `true` when every bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_content() {
        assert_eq!(normalize_content("  Lives   in\tAustin "), "lives in austin");
        assert_eq!(normalize_content(""), "");
        assert_eq!(normalize_content("  \n "), "");
    }

    #[test]
    fn test_dedup_key_ignores_case_and_whitespace() {
        let a = MemoryItem::new(MemoryKind::Fact, "Lives in Austin".to_string(), None);
        let b = MemoryItem::new(MemoryKind::Fact, "lives  in austin".to_string(), None);
        assert_eq!(a.dedup_key(), b.dedup_key());

        let c = MemoryItem::new(MemoryKind::Preference, "lives in austin".to_string(), None);
        assert_ne!(a.dedup_key(), c.dedup_key());
    }

    #[test]
    fn test_confidence_rank_ordering() {
        assert!(ConfidenceLabel::High.rank() > ConfidenceLabel::Medium.rank());
        assert!(ConfidenceLabel::Medium.rank() > ConfidenceLabel::Low.rank());
    }

    #[test]
    fn test_kind_parse_lossy_defaults_to_fact() {
        assert_eq!(MemoryKind::parse_lossy("preference"), MemoryKind::Preference);
        assert_eq!(MemoryKind::parse_lossy("Pattern"), MemoryKind::Pattern);
        assert_eq!(MemoryKind::parse_lossy("unknown"), MemoryKind::Fact);
    }

    #[test]
    fn test_stats_clamped() {
        let stats = UserStats {
            anxiety: 150.0,
            paralysis: -20.0,
            optimism: 50.0,
            stress: 100.0,
        };
        let clamped = stats.clamped();
        assert!((clamped.anxiety - 100.0).abs() < f32::EPSILON);
        assert!(clamped.paralysis.abs() < f32::EPSILON);
        assert!((clamped.optimism - 50.0).abs() < f32::EPSILON);
        assert!((clamped.stress - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_all_items_bucket_order() {
        let output = MemoryOutput {
            preferences: vec![MemoryItem::new(
                MemoryKind::Preference,
                "likes coffee".to_string(),
                None,
            )],
            patterns: vec![MemoryItem::new(
                MemoryKind::Pattern,
                "works late".to_string(),
                None,
            )],
            facts: vec![MemoryItem::new(
                MemoryKind::Fact,
                "lives in Austin".to_string(),
                None,
            )],
            stats: UserStats::default(),
        };
        let all = output.all_items();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].kind, MemoryKind::Preference);
        assert_eq!(all[2].kind, MemoryKind::Fact);
    }

    #[test]
    fn test_memory_output_serde_round_trip() {
        let output = MemoryOutput {
            facts: vec![MemoryItem {
                kind: MemoryKind::Fact,
                content: "works remotely".to_string(),
                evidence_indices: Some(vec![2]),
                confidence: ConfidenceLabel::High,
                embedding: None,
            }],
            ..MemoryOutput::default()
        };
        let json = serde_json::to_string(&output).unwrap();
        let parsed: MemoryOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, output);
        assert!(json.contains("\"kind\":\"fact\""));
        assert!(json.contains("\"confidence\":\"high\""));
    }
}
