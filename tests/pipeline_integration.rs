//! End-to-end pipeline integration tests.
//!
//! Exercises the full ingest-then-respond flow against mock oracle and
//! embedding backends, the JSON snapshot store on a temp directory, and the
//! in-memory vector index.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use confidant::embedding::Embedder;
use confidant::llm::{CompletionRequest, LlmProvider};
use confidant::persona::PersonaName;
use confidant::pipeline::{MemoryPipeline, ResponsePipeline};
use confidant::storage::{InMemoryIndex, JsonSnapshotStore};
use confidant::{ConfidenceLabel, MemoryKind, Result, SnapshotStore};
use std::sync::Mutex;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

const EXTRACTION_RESPONSE: &str = r#"{
    "preferences": [
        {"type": "preference", "content": "Really loves spicy food", "evidence_indices": [0]},
        {"type": "preference", "content": "really loves  spicy food", "evidence_indices": [2]}
    ],
    "patterns": [
        {"type": "pattern", "content": "Tends to work late when stressed", "evidence_indices": [1]}
    ],
    "facts": [
        {"type": "fact", "content": "Works remotely", "evidence_indices": [1]}
    ]
}"#;

/// Routes each oracle call to a canned answer based on the system prompt.
struct MockOracle {
    calls: Mutex<Vec<CompletionRequest>>,
}

impl MockOracle {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl LlmProvider for MockOracle {
    fn name(&self) -> &'static str {
        "mock-oracle"
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.lock().unwrap().push(request.clone());
        let system = request.system.as_deref().unwrap_or_default();

        if system.contains("memory extraction") {
            Ok(EXTRACTION_RESPONSE.to_string())
        } else if system.contains("expert emotion classifier") {
            Ok(r#"{"state": "stressed", "sentiment": "negative", "emotion": "anxiety", "confidence": 0.85}"#
                .to_string())
        } else if system.contains("Write a helpful, factual reply") {
            Ok("Consider blocking out an hour tonight to decompress.".to_string())
        } else {
            Ok("It sounds like you're carrying a lot right now; one small step is enough."
                .to_string())
        }
    }
}

/// Deterministic embedder: vector derived from content length, fixed width.
struct MockEmbedder;

impl Embedder for MockEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let seed = text.len() as f32;
        Ok(vec![seed, seed.sqrt(), 1.0])
    }
}

fn user_messages() -> Vec<String> {
    vec![
        "I really love spicy food, the hotter the better".to_string(),
        "I work remotely and I've been working late every night this week".to_string(),
        "Seriously, I really love spicy food".to_string(),
    ]
}

// ============================================================================
// Ingest Flow
// ============================================================================

#[test]
fn test_ingest_persists_cleaned_memory_to_both_sinks() {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonSnapshotStore::new(dir.path().join("memory.json"));
    let index = InMemoryIndex::new();
    let oracle = MockOracle::new();

    let pipeline =
        MemoryPipeline::new(&oracle, MockEmbedder, &store, &index).expect("valid config");
    let output = pipeline.ingest(&user_messages()).expect("ingest succeeds");

    // Duplicate preference merged; pattern and fact kept.
    assert_eq!(output.preferences.len(), 1);
    assert_eq!(output.patterns.len(), 1);
    assert_eq!(output.facts.len(), 1);

    // Merged evidence is the sorted union of both duplicates.
    assert_eq!(output.preferences[0].evidence_indices, Some(vec![0, 2]));

    // "really" triggers the intensifier boost (0.4 + 0.3), below the high
    // threshold of 0.75.
    assert_eq!(output.preferences[0].confidence, ConfidenceLabel::Medium);

    // Snapshot round-trips exactly.
    let reloaded = store.load().expect("load").expect("snapshot present");
    assert_eq!(reloaded, output);

    // One vector point per cleaned item.
    assert_eq!(index.len().unwrap(), 3);

    // Exactly one oracle call: extraction only.
    assert_eq!(oracle.call_count(), 1);
}

#[test]
fn test_reingest_overwrites_snapshot_but_grows_index() {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonSnapshotStore::new(dir.path().join("memory.json"));
    let index = InMemoryIndex::new();
    let oracle = MockOracle::new();

    let pipeline =
        MemoryPipeline::new(&oracle, MockEmbedder, &store, &index).expect("valid config");
    pipeline.ingest(&user_messages()).expect("first ingest");
    pipeline.ingest(&user_messages()).expect("second ingest");

    // The record store holds only the latest run.
    let reloaded = store.load().expect("load").expect("snapshot present");
    assert_eq!(reloaded.len(), 3);

    // The index is additive across runs.
    assert_eq!(index.len().unwrap(), 6);
}

// ============================================================================
// Respond Flow
// ============================================================================

#[test]
fn test_respond_after_ingest_uses_retrieved_memory() {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonSnapshotStore::new(dir.path().join("memory.json"));
    let index = InMemoryIndex::new();
    let oracle = MockOracle::new();

    MemoryPipeline::new(&oracle, MockEmbedder, &store, &index)
        .expect("valid config")
        .ingest(&user_messages())
        .expect("ingest succeeds");

    let responder = ResponsePipeline::new(&oracle, MockEmbedder, &store, &index);
    let trace = responder
        .run("I can't keep up with everything at work", None, 2)
        .expect("respond succeeds");

    // Stressed state maps to the therapist persona.
    let state = trace.emotional_state.as_ref().expect("state present");
    assert_eq!(state.emotion, "anxiety");
    assert_eq!(trace.persona.name, PersonaName::Therapist);
    assert!(trace.persona.rationale.contains("sentiment=negative"));

    // Retrieval honored top_k and rebuilt typed items.
    assert_eq!(trace.semantic_memory.len(), 2);
    for item in &trace.semantic_memory {
        assert!(matches!(
            item.kind,
            MemoryKind::Preference | MemoryKind::Pattern | MemoryKind::Fact
        ));
        assert!(!item.content.is_empty());
    }

    // The structured snapshot from the ingest run was loaded.
    assert_eq!(trace.structured_memory.as_ref().map(confidant::MemoryOutput::len), Some(3));

    assert_eq!(
        trace.neutral_reply,
        "Consider blocking out an hour tonight to decompress."
    );
    assert!(trace.final_reply.contains("one small step"));
}

#[test]
fn test_respond_with_empty_stores_still_replies() {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonSnapshotStore::new(dir.path().join("absent.json"));
    let index = InMemoryIndex::new();
    let oracle = MockOracle::new();

    let responder = ResponsePipeline::new(&oracle, MockEmbedder, &store, &index);
    let trace = responder.run("hello there", None, 5).expect("respond succeeds");

    assert!(trace.semantic_memory.is_empty());
    assert!(trace.structured_memory.is_none());
    assert!(!trace.final_reply.is_empty());
}

#[test]
fn test_persona_override_bypasses_emotional_state() {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonSnapshotStore::new(dir.path().join("memory.json"));
    let index = InMemoryIndex::new();
    let oracle = MockOracle::new();

    let responder = ResponsePipeline::new(&oracle, MockEmbedder, &store, &index);
    let trace = responder
        .run("I can't keep up with everything", Some(PersonaName::WittyFriend), 5)
        .expect("respond succeeds");

    assert_eq!(trace.persona.name, PersonaName::WittyFriend);
    assert!(trace.persona.rationale.contains("override"));
}
