//! In-memory vector index.
//!
//! Brute-force cosine similarity over a `Mutex`-guarded point list. Used in
//! tests and for offline runs where no Qdrant instance is available.

use super::{ScoredPoint, VectorIndex, VectorPoint};
use crate::{Error, Result};
use std::sync::Mutex;

/// [`VectorIndex`] holding all points in process memory.
#[derive(Default)]
pub struct InMemoryIndex {
    state: Mutex<IndexState>,
}

#[derive(Default)]
struct IndexState {
    dimensions: Option<usize>,
    points: Vec<VectorPoint>,
}

impl InMemoryIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points currently stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.points.len())
    }

    /// Returns `true` when no points are stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, IndexState>> {
        self.state.lock().map_err(|_| Error::OperationFailed {
            operation: "index_lock".to_string(),
            cause: "index state lock poisoned".to_string(),
        })
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a < f32::EPSILON || norm_b < f32::EPSILON {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl VectorIndex for InMemoryIndex {
    fn ensure_collection(&self, dimensions: usize) -> Result<()> {
        let mut state = self.lock()?;
        match state.dimensions {
            None => {
                state.dimensions = Some(dimensions);
                Ok(())
            }
            Some(existing) if existing == dimensions => Ok(()),
            Some(existing) => Err(Error::OperationFailed {
                operation: "index_collection_create".to_string(),
                cause: format!(
                    "collection already exists with dimensionality {existing}, got {dimensions}"
                ),
            }),
        }
    }

    fn upsert(&self, points: Vec<VectorPoint>) -> Result<()> {
        let mut state = self.lock()?;
        for point in points {
            if let Some(existing) = state.points.iter_mut().find(|p| p.id == point.id) {
                *existing = point;
            } else {
                state.points.push(point);
            }
        }
        Ok(())
    }

    fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>> {
        let state = self.lock()?;
        let mut scored: Vec<ScoredPoint> = state
            .points
            .iter()
            .map(|point| ScoredPoint {
                score: cosine_similarity(vector, &point.vector),
                payload: Some(point.payload.clone()),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        Ok(scored)
    }
}
