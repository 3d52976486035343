//! Persistence layer.
//!
//! Two independent sinks used after cleanup: a record store holding the
//! latest [`MemoryOutput`] snapshot, and a vector index holding one point
//! per memory item for semantic retrieval. Both are best-effort from the
//! orchestrator's point of view; a failure in either never discards the
//! in-memory cleaned output.
//!
//! # Available Implementations
//!
//! | Backend | Use Case |
//! |---------|----------|
//! | [`JsonSnapshotStore`] | Default record store; one JSON file |
//! | [`QdrantIndex`] | Vector index over the Qdrant REST API |
//! | [`InMemoryIndex`] | Testing and offline use; brute-force cosine |

mod indexer;
mod memory_index;
mod qdrant;
mod retriever;
mod snapshot;

pub use indexer::MemoryIndexer;
pub use memory_index::InMemoryIndex;
pub use qdrant::QdrantIndex;
pub use retriever::SemanticRetriever;
pub use snapshot::JsonSnapshotStore;

use crate::models::{ConfidenceLabel, MemoryKind, MemoryOutput};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Schema version written into every vector point payload.
pub const PAYLOAD_SCHEMA_VERSION: u32 = 1;

/// Durable record store for the latest memory snapshot.
///
/// Write replaces, read returns latest-or-absent. Last writer wins; there is
/// no concurrency control across pipeline runs.
pub trait SnapshotStore: Send + Sync {
    /// Persists `output`, overwriting any previous snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn save(&self, output: &MemoryOutput) -> Result<()>;

    /// Loads the last saved snapshot.
    ///
    /// Returns `Ok(None)` when no snapshot exists or the stored bytes fail
    /// to deserialize; a corrupt snapshot must not crash the caller.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures distinct from absence.
    fn load(&self) -> Result<Option<MemoryOutput>>;
}

/// Typed payload carried by every vector point.
///
/// Validated at the boundary on both write and read: a point whose payload
/// does not deserialize into this shape is skipped during retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryPointPayload {
    /// Payload schema version.
    pub schema_version: u32,
    /// Memory kind.
    pub kind: MemoryKind,
    /// Item content.
    pub content: String,
    /// Confidence label.
    pub confidence: ConfidenceLabel,
    /// Supporting message indices.
    #[serde(default)]
    pub evidence_indices: Vec<usize>,
}

/// One point to upsert into the vector index.
#[derive(Debug, Clone, Serialize)]
pub struct VectorPoint {
    /// Unique identifier, freshly generated per upsert.
    pub id: String,
    /// Embedding vector.
    pub vector: Vec<f32>,
    /// Typed payload.
    pub payload: MemoryPointPayload,
}

/// One similarity-search hit.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    /// Cosine similarity score, higher is closer.
    pub score: f32,
    /// The point payload, if it decoded into the known schema.
    pub payload: Option<MemoryPointPayload>,
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn save(&self, output: &MemoryOutput) -> Result<()> {
        (**self).save(output)
    }

    fn load(&self) -> Result<Option<MemoryOutput>> {
        (**self).load()
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for std::sync::Arc<S> {
    fn save(&self, output: &MemoryOutput) -> Result<()> {
        (**self).save(output)
    }

    fn load(&self) -> Result<Option<MemoryOutput>> {
        (**self).load()
    }
}

/// Named vector collection supporting create-if-absent, additive upsert,
/// and top-k nearest-neighbor search under cosine similarity.
pub trait VectorIndex: Send + Sync {
    /// Creates the collection with the given dimensionality if it does not
    /// already exist. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is unreachable or creation fails.
    fn ensure_collection(&self, dimensions: usize) -> Result<()>;

    /// Upserts points. Identifiers are expected to be unique, so concurrent
    /// writers interleave without corrupting the index.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    fn upsert(&self, points: Vec<VectorPoint>) -> Result<()>;

    /// Returns the top-`limit` nearest points, nearest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>>;
}

impl<V: VectorIndex + ?Sized> VectorIndex for &V {
    fn ensure_collection(&self, dimensions: usize) -> Result<()> {
        (**self).ensure_collection(dimensions)
    }

    fn upsert(&self, points: Vec<VectorPoint>) -> Result<()> {
        (**self).upsert(points)
    }

    fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>> {
        (**self).search(vector, limit)
    }
}

impl<V: VectorIndex + ?Sized> VectorIndex for std::sync::Arc<V> {
    fn ensure_collection(&self, dimensions: usize) -> Result<()> {
        (**self).ensure_collection(dimensions)
    }

    fn upsert(&self, points: Vec<VectorPoint>) -> Result<()> {
        (**self).upsert(points)
    }

    fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>> {
        (**self).search(vector, limit)
    }
}
