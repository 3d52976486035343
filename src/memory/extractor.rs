//! LLM-based memory extraction.
//!
//! Builds one prompt enumerating every message with its index and asks the
//! oracle to partition content into three buckets. The extractor tolerates a
//! partially malformed structured object (missing buckets, junk evidence),
//! but a failed oracle call propagates: a failed extraction with no
//! fabricated data is safer than false memory.

use crate::llm::{CompletionRequest, LlmProvider, structured_generate};
use crate::models::{MemoryItem, MemoryKind, MemoryOutput, normalize_content};
use crate::Result;

const EXTRACTION_SYSTEM_PROMPT: &str = r"You are an AI specializing in user modeling and memory extraction
for a long-term companion system.

You will be given a list of past messages from a single user.
Your job is to extract three types of memory:

1) User preferences (likes, dislikes, stable preferences, constraints)
2) User emotional or behavioral patterns (how they tend to respond, recurring themes)
3) Concrete facts worth remembering (job, location hints, key personal details)

Follow these rules:
- Be concise but specific.
- Prefer stable, recurring traits over one-off events.
- If unsure, omit rather than hallucinate.
- Always return VALID JSON ONLY, with no extra commentary.";

/// Extracts structured memory candidates from user messages.
pub struct MemoryExtractor<P: LlmProvider> {
    llm: P,
}

impl<P: LlmProvider> MemoryExtractor<P> {
    /// Creates an extractor over the given provider.
    #[must_use]
    pub const fn new(llm: P) -> Self {
        Self { llm }
    }

    /// Runs extraction over a batch of messages.
    ///
    /// Returns an unscored, unmerged [`MemoryOutput`]; confidence labels are
    /// left at their default and must be populated by the scorer.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's terminal error when the oracle call or
    /// structured parsing fails. There is no fallback extraction.
    pub fn extract(&self, messages: &[String]) -> Result<MemoryOutput> {
        let request = CompletionRequest::new(
            Some(EXTRACTION_SYSTEM_PROMPT.to_string()),
            build_user_prompt(messages),
        )
        .with_temperature(0.1)
        .with_max_tokens(1024);

        let raw = structured_generate(&self.llm, "extract_memory", &request)?;

        let output = MemoryOutput {
            preferences: parse_bucket(&raw, "preferences", MemoryKind::Preference),
            patterns: parse_bucket(&raw, "patterns", MemoryKind::Pattern),
            facts: parse_bucket(&raw, "facts", MemoryKind::Fact),
            ..MemoryOutput::default()
        };
        tracing::info!(
            "Extracted {} preferences, {} patterns, {} facts from {} messages",
            output.preferences.len(),
            output.patterns.len(),
            output.facts.len(),
            messages.len()
        );
        Ok(output)
    }
}

/// Enumerates the messages and describes the expected JSON shape.
fn build_user_prompt(messages: &[String]) -> String {
    let joined = messages
        .iter()
        .enumerate()
        .map(|(i, m)| format!("- {i}: {m}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Here are the user's past messages (index: text):

{joined}

Extract memories in the following JSON format:

{{
  "preferences": [
    {{ "type": "preference", "content": "string", "evidence_indices": [0] }}
  ],
  "patterns": [
    {{ "type": "pattern", "content": "string", "evidence_indices": [0] }}
  ],
  "facts": [
    {{ "type": "fact", "content": "string", "evidence_indices": [0] }}
  ]
}}

- Use arrays (which may be empty) for each key.
- evidence_indices should reference the indices listed above.
- Do not include a 'confidence' field; that will be computed later."#
    )
}

/// Parses one bucket from the structured object.
///
/// An absent or non-array bucket is treated as empty, never an error.
/// Entries with empty normalized content are dropped. Evidence is accepted
/// only as an array of non-negative integers; anything else is absent.
fn parse_bucket(raw: &serde_json::Value, key: &str, kind: MemoryKind) -> Vec<MemoryItem> {
    let Some(entries) = raw.get(key).and_then(serde_json::Value::as_array) else {
        tracing::debug!("Extraction bucket '{key}' missing or malformed, treating as empty");
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let content = entry.get("content").and_then(serde_json::Value::as_str)?;
            if normalize_content(content).is_empty() {
                return None;
            }
            Some(MemoryItem::new(
                kind,
                content.trim().to_string(),
                parse_evidence(entry.get("evidence_indices")),
            ))
        })
        .collect()
}

fn parse_evidence(value: Option<&serde_json::Value>) -> Option<Vec<usize>> {
    let entries = value?.as_array()?;
    let indices: Vec<usize> = entries
        .iter()
        .filter_map(serde_json::Value::as_u64)
        .filter_map(|i| usize::try_from(i).ok())
        .collect();
    Some(indices)
}
