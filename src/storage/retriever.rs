//! Semantic retrieval from the vector index.
//!
//! Embeds a query and rebuilds memory items from the payloads of the nearest
//! points. Retrieval is best-effort context enrichment: a failed or empty
//! query embedding yields an empty result instead of an error.

use super::VectorIndex;
use crate::embedding::Embedder;
use crate::models::MemoryItem;
use crate::Result;

/// Retrieves semantically similar memory items for a query.
pub struct SemanticRetriever<E: Embedder, V: VectorIndex> {
    embedder: E,
    index: V,
}

impl<E: Embedder, V: VectorIndex> SemanticRetriever<E, V> {
    /// Creates a retriever over the given embedder and index.
    #[must_use]
    pub const fn new(embedder: E, index: V) -> Self {
        Self { embedder, index }
    }

    /// Returns up to `top_k` memory items nearest to `query`.
    ///
    /// An empty or failed query embedding short-circuits to an empty list
    /// without touching the index. Points whose payloads fail to decode are
    /// skipped, as are items with blank content.
    ///
    /// # Errors
    ///
    /// Returns an error only if the index search itself fails.
    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<MemoryItem>> {
        let vector = match self.embedder.embed(query) {
            Ok(vector) => vector,
            Err(e) => {
                tracing::warn!(error = %e, "Query embedding failed; returning no memories");
                return Ok(Vec::new());
            }
        };
        if vector.is_empty() {
            return Ok(Vec::new());
        }

        let hits = self.index.search(&vector, top_k)?;
        let items: Vec<MemoryItem> = hits
            .into_iter()
            .filter_map(|hit| hit.payload)
            .filter(|payload| !payload.content.trim().is_empty())
            .map(|payload| MemoryItem {
                kind: payload.kind,
                content: payload.content,
                evidence_indices: if payload.evidence_indices.is_empty() {
                    None
                } else {
                    Some(payload.evidence_indices)
                },
                confidence: payload.confidence,
                embedding: None,
            })
            .collect();

        tracing::debug!(count = items.len(), top_k, "Retrieved semantic memories");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfidenceLabel, MemoryKind};
    use crate::storage::{InMemoryIndex, MemoryPointPayload, PAYLOAD_SCHEMA_VERSION, VectorPoint};
    use crate::{Error, Result};

    struct StubEmbedder {
        vector: Vec<f32>,
    }

    impl Embedder for StubEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.vector.clone())
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::OperationFailed {
                operation: "embed".to_string(),
                cause: "backend down".to_string(),
            })
        }
    }

    fn seeded_index() -> InMemoryIndex {
        let index = InMemoryIndex::new();
        index.ensure_collection(2).unwrap();
        index
            .upsert(vec![
                VectorPoint {
                    id: "a".to_string(),
                    vector: vec![1.0, 0.0],
                    payload: MemoryPointPayload {
                        schema_version: PAYLOAD_SCHEMA_VERSION,
                        kind: MemoryKind::Preference,
                        content: "likes spicy food".to_string(),
                        confidence: ConfidenceLabel::High,
                        evidence_indices: vec![0],
                    },
                },
                VectorPoint {
                    id: "b".to_string(),
                    vector: vec![0.0, 1.0],
                    payload: MemoryPointPayload {
                        schema_version: PAYLOAD_SCHEMA_VERSION,
                        kind: MemoryKind::Fact,
                        content: "   ".to_string(),
                        confidence: ConfidenceLabel::Low,
                        evidence_indices: Vec::new(),
                    },
                },
            ])
            .unwrap();
        index
    }

    #[test]
    fn test_retrieve_rebuilds_items_from_payloads() {
        let index = seeded_index();
        let retriever = SemanticRetriever::new(StubEmbedder { vector: vec![1.0, 0.0] }, &index);

        let items = retriever.retrieve("what food do I like?", 5).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, MemoryKind::Preference);
        assert_eq!(items[0].content, "likes spicy food");
        assert_eq!(items[0].confidence, ConfidenceLabel::High);
        assert_eq!(items[0].evidence_indices, Some(vec![0]));
        assert!(items[0].embedding.is_none());
    }

    #[test]
    fn test_empty_query_embedding_returns_nothing() {
        let index = seeded_index();
        let retriever = SemanticRetriever::new(StubEmbedder { vector: Vec::new() }, &index);
        assert!(retriever.retrieve("", 5).unwrap().is_empty());
    }

    #[test]
    fn test_embedding_failure_degrades_to_empty() {
        let index = seeded_index();
        let retriever = SemanticRetriever::new(FailingEmbedder, &index);
        assert!(retriever.retrieve("anything", 5).unwrap().is_empty());
    }

    #[test]
    fn test_blank_content_items_are_dropped() {
        let index = seeded_index();
        let retriever = SemanticRetriever::new(StubEmbedder { vector: vec![0.0, 1.0] }, &index);
        let items = retriever.retrieve("query", 5).unwrap();
        assert!(items.iter().all(|item| !item.content.trim().is_empty()));
    }
}
