//! Cleanup and per-bucket deduplication.
//!
//! Items are grouped by `(kind, normalized content)` within each bucket;
//! buckets never cross-merge. The survivor is the item with the higher
//! confidence rank; equal ranks keep the first-seen item. Evidence indices
//! are always merged as a sorted set-union — this stage never invents or
//! drops evidence.
//!
//! Output order is first-seen key order, so identical input always yields
//! identical output, and the whole operation is idempotent.

use crate::models::{MemoryItem, MemoryKind, MemoryOutput};
use std::collections::HashMap;

/// Deduplicates and merges a memory output, bucket by bucket.
#[must_use]
pub fn clean_memory_output(output: MemoryOutput) -> MemoryOutput {
    MemoryOutput {
        preferences: deduplicate(output.preferences),
        patterns: deduplicate(output.patterns),
        facts: deduplicate(output.facts),
        stats: output.stats,
    }
}

fn deduplicate(items: Vec<MemoryItem>) -> Vec<MemoryItem> {
    let mut survivors: Vec<MemoryItem> = Vec::with_capacity(items.len());
    let mut by_key: HashMap<(MemoryKind, String), usize> = HashMap::new();

    for item in items {
        let key = item.dedup_key();
        match by_key.get(&key) {
            None => {
                by_key.insert(key, survivors.len());
                survivors.push(item);
            },
            Some(&slot) => {
                let existing = &mut survivors[slot];
                let merged = merge_evidence(existing.evidence_indices.as_deref(), item.evidence_indices.as_deref());
                // Strictly-higher rank replaces; ties keep the first-seen item.
                if item.confidence.rank() > existing.confidence.rank() {
                    *existing = item;
                }
                existing.evidence_indices = merged;
            },
        }
    }

    survivors
}

/// Sorted, deduplicated union of two evidence sets.
fn merge_evidence(a: Option<&[usize]>, b: Option<&[usize]>) -> Option<Vec<usize>> {
    if a.is_none() && b.is_none() {
        return None;
    }
    let mut merged: Vec<usize> = a
        .unwrap_or_default()
        .iter()
        .chain(b.unwrap_or_default().iter())
        .copied()
        .collect();
    merged.sort_unstable();
    merged.dedup();
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConfidenceLabel;
    use proptest::prelude::*;

    fn item(
        kind: MemoryKind,
        content: &str,
        confidence: ConfidenceLabel,
        evidence: Option<Vec<usize>>,
    ) -> MemoryItem {
        MemoryItem {
            kind,
            content: content.to_string(),
            evidence_indices: evidence,
            confidence,
            embedding: None,
        }
    }

    #[test]
    fn test_duplicates_merge_to_max_confidence_and_evidence_union() {
        let output = MemoryOutput {
            facts: vec![
                item(MemoryKind::Fact, "Lives in Austin", ConfidenceLabel::High, Some(vec![0])),
                item(MemoryKind::Fact, "lives in austin", ConfidenceLabel::Medium, Some(vec![2])),
            ],
            ..MemoryOutput::default()
        };
        let cleaned = clean_memory_output(output);
        assert_eq!(cleaned.facts.len(), 1);
        let survivor = &cleaned.facts[0];
        assert_eq!(survivor.content, "Lives in Austin");
        assert_eq!(survivor.confidence, ConfidenceLabel::High);
        assert_eq!(survivor.evidence_indices, Some(vec![0, 2]));
    }

    #[test]
    fn test_higher_confidence_later_item_wins() {
        let output = MemoryOutput {
            preferences: vec![
                item(MemoryKind::Preference, "likes tea", ConfidenceLabel::Low, Some(vec![1])),
                item(MemoryKind::Preference, "Likes Tea", ConfidenceLabel::High, Some(vec![3])),
            ],
            ..MemoryOutput::default()
        };
        let cleaned = clean_memory_output(output);
        assert_eq!(cleaned.preferences.len(), 1);
        assert_eq!(cleaned.preferences[0].content, "Likes Tea");
        assert_eq!(cleaned.preferences[0].confidence, ConfidenceLabel::High);
        assert_eq!(cleaned.preferences[0].evidence_indices, Some(vec![1, 3]));
    }

    #[test]
    fn test_equal_rank_keeps_first_seen() {
        let output = MemoryOutput {
            facts: vec![
                item(MemoryKind::Fact, "Works remotely", ConfidenceLabel::Medium, None),
                item(MemoryKind::Fact, "works  REMOTELY", ConfidenceLabel::Medium, Some(vec![5])),
            ],
            ..MemoryOutput::default()
        };
        let cleaned = clean_memory_output(output);
        assert_eq!(cleaned.facts[0].content, "Works remotely");
        assert_eq!(cleaned.facts[0].evidence_indices, Some(vec![5]));
    }

    #[test]
    fn test_buckets_never_cross_merge() {
        let output = MemoryOutput {
            preferences: vec![item(
                MemoryKind::Preference,
                "spicy food",
                ConfidenceLabel::Medium,
                None,
            )],
            facts: vec![item(MemoryKind::Fact, "spicy food", ConfidenceLabel::Medium, None)],
            ..MemoryOutput::default()
        };
        let cleaned = clean_memory_output(output);
        assert_eq!(cleaned.preferences.len(), 1);
        assert_eq!(cleaned.facts.len(), 1);
    }

    #[test]
    fn test_order_is_first_seen_and_deterministic() {
        let make = || MemoryOutput {
            facts: vec![
                item(MemoryKind::Fact, "b", ConfidenceLabel::Low, None),
                item(MemoryKind::Fact, "a", ConfidenceLabel::Low, None),
                item(MemoryKind::Fact, "B", ConfidenceLabel::Low, None),
            ],
            ..MemoryOutput::default()
        };
        let first = clean_memory_output(make());
        let second = clean_memory_output(make());
        assert_eq!(first, second);
        assert_eq!(first.facts.len(), 2);
        assert_eq!(first.facts[0].content, "b");
        assert_eq!(first.facts[1].content, "a");
    }

    #[test]
    fn test_stats_preserved() {
        let output = MemoryOutput {
            stats: crate::models::UserStats {
                anxiety: 40.0,
                stress: 65.0,
                ..crate::models::UserStats::default()
            },
            ..MemoryOutput::default()
        };
        let cleaned = clean_memory_output(output.clone());
        assert_eq!(cleaned.stats, output.stats);
    }

    prop_compose! {
        fn arb_item()(
            kind in prop_oneof![
                Just(MemoryKind::Preference),
                Just(MemoryKind::Pattern),
                Just(MemoryKind::Fact),
            ],
            content in prop_oneof![
                Just("likes coffee".to_string()),
                Just("Likes Coffee".to_string()),
                Just("works remotely".to_string()),
                Just("lives in austin".to_string()),
                "[a-z]{1,8}",
            ],
            confidence in prop_oneof![
                Just(ConfidenceLabel::High),
                Just(ConfidenceLabel::Medium),
                Just(ConfidenceLabel::Low),
            ],
            evidence in proptest::option::of(proptest::collection::vec(0usize..10, 0..4)),
        ) -> MemoryItem {
            MemoryItem {
                kind,
                content,
                evidence_indices: evidence,
                confidence,
                embedding: None,
            }
        }
    }

    prop_compose! {
        fn arb_output()(
            preferences in proptest::collection::vec(arb_item(), 0..6),
            patterns in proptest::collection::vec(arb_item(), 0..6),
            facts in proptest::collection::vec(arb_item(), 0..6),
        ) -> MemoryOutput {
            MemoryOutput { preferences, patterns, facts, stats: crate::models::UserStats::default() }
        }
    }

    proptest! {
        #[test]
        fn prop_cleanup_is_idempotent(output in arb_output()) {
            let once = clean_memory_output(output);
            let twice = clean_memory_output(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_no_duplicate_keys_after_cleanup(output in arb_output()) {
            let cleaned = clean_memory_output(output);
            for bucket in [&cleaned.preferences, &cleaned.patterns, &cleaned.facts] {
                let mut keys: Vec<_> = bucket.iter().map(MemoryItem::dedup_key).collect();
                let total = keys.len();
                keys.sort();
                keys.dedup();
                prop_assert_eq!(keys.len(), total);
            }
        }
    }
}
