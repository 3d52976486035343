//! Memory indexing into the vector index.
//!
//! Flattens the cleaned output, embeds all item contents in one batch call,
//! and upserts one point per item with a fresh identifier. Re-ingestion adds
//! new points rather than replacing old ones.

use super::{MemoryPointPayload, PAYLOAD_SCHEMA_VERSION, VectorIndex, VectorPoint};
use crate::embedding::Embedder;
use crate::models::MemoryOutput;
use crate::Result;
use uuid::Uuid;

/// Writes cleaned memory output into a [`VectorIndex`].
pub struct MemoryIndexer<E: Embedder, V: VectorIndex> {
    embedder: E,
    index: V,
}

impl<E: Embedder, V: VectorIndex> MemoryIndexer<E, V> {
    /// Creates an indexer over the given embedder and index.
    #[must_use]
    pub const fn new(embedder: E, index: V) -> Self {
        Self { embedder, index }
    }

    /// Embeds and upserts every item in `output`.
    ///
    /// Skips silently when the output has no items, and skips with a warning
    /// when the embedding backend returns zero-dimensional vectors, so a
    /// missing embedding service degrades indexing without failing the run.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding, collection creation, or the upsert
    /// fails.
    pub fn index(&self, output: &MemoryOutput) -> Result<usize> {
        let items = output.all_items();
        if items.is_empty() {
            tracing::debug!("No memory items to index");
            return Ok(0);
        }

        let texts: Vec<&str> = items.iter().map(|item| item.content.as_str()).collect();
        let vectors = self.embedder.embed_batch(&texts)?;

        let dimensions = vectors.first().map_or(0, Vec::len);
        if dimensions == 0 {
            tracing::warn!("Embedding backend returned empty vectors; skipping indexing");
            return Ok(0);
        }

        self.index.ensure_collection(dimensions)?;

        let points: Vec<VectorPoint> = items
            .iter()
            .zip(vectors)
            .map(|(item, vector)| VectorPoint {
                id: Uuid::new_v4().to_string(),
                vector,
                payload: MemoryPointPayload {
                    schema_version: PAYLOAD_SCHEMA_VERSION,
                    kind: item.kind,
                    content: item.content.clone(),
                    confidence: item.confidence,
                    evidence_indices: item.evidence_indices.clone().unwrap_or_default(),
                },
            })
            .collect();

        let count = points.len();
        self.index.upsert(points)?;
        tracing::info!(count, "Indexed memory items");
        Ok(count)
    }
}
