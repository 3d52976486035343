//! Memory ingestion pipeline.

use crate::config::ConfidenceConfig;
use crate::embedding::Embedder;
use crate::llm::LlmProvider;
use crate::memory::{ConfidenceScorer, MemoryExtractor, clean_memory_output};
use crate::models::MemoryOutput;
use crate::storage::{MemoryIndexer, SnapshotStore, VectorIndex};
use crate::Result;

/// Turns raw user messages into cleaned, persisted memory.
///
/// Stage order is fixed: extract, score, dedup, then persist to the record
/// store and the vector index. Extraction failure aborts the run; either
/// persistence sink failing is logged and absorbed, so the cleaned output is
/// always returned to the caller.
pub struct MemoryPipeline<P, E, S, V>
where
    P: LlmProvider,
    E: Embedder,
    S: SnapshotStore,
    V: VectorIndex,
{
    llm: P,
    embedder: E,
    snapshots: S,
    index: V,
    scorer: ConfidenceScorer,
}

impl<P, E, S, V> MemoryPipeline<P, E, S, V>
where
    P: LlmProvider,
    E: Embedder,
    S: SnapshotStore,
    V: VectorIndex,
{
    /// Creates a pipeline with default confidence thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] if the confidence
    /// configuration fails validation.
    pub fn new(llm: P, embedder: E, snapshots: S, index: V) -> Result<Self> {
        Self::with_confidence(llm, embedder, snapshots, index, ConfidenceConfig::default())
    }

    /// Creates a pipeline with explicit confidence configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] if the confidence
    /// configuration fails validation.
    pub fn with_confidence(
        llm: P,
        embedder: E,
        snapshots: S,
        index: V,
        confidence: ConfidenceConfig,
    ) -> Result<Self> {
        Ok(Self {
            llm,
            embedder,
            snapshots,
            index,
            scorer: ConfidenceScorer::new(confidence)?,
        })
    }

    /// Ingests a batch of messages into memory.
    ///
    /// Returns the cleaned output even when persistence fails; losing a
    /// snapshot write must not lose the extraction work.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction fails. Persistence failures are
    /// absorbed.
    pub fn ingest(&self, messages: &[String]) -> Result<MemoryOutput> {
        let span = tracing::info_span!("pipeline.ingest", messages = messages.len());
        let _guard = span.enter();

        if messages.is_empty() {
            tracing::debug!("No messages to ingest");
            return Ok(MemoryOutput::default());
        }

        let extracted = MemoryExtractor::new(&self.llm).extract(messages)?;
        let scored = self.scorer.score(extracted, messages);
        let cleaned = clean_memory_output(scored);

        metrics::counter!("memory_items_ingested_total").increment(cleaned.len() as u64);

        if let Err(e) = self.snapshots.save(&cleaned) {
            tracing::warn!(error = %e, "Snapshot save failed; continuing with in-memory output");
        }
        let indexer = MemoryIndexer::new(&self.embedder, &self.index);
        if let Err(e) = indexer.index(&cleaned) {
            tracing::warn!(error = %e, "Vector indexing failed; memories not searchable this run");
        }

        Ok(cleaned)
    }
}
