//! Memory engine.
//!
//! Turns a batch of user messages into structured memory:
//!
//! 1. LLM-based extraction into three buckets (preference / pattern / fact)
//! 2. Heuristic confidence scoring (high / medium / low)
//! 3. Cleanup and per-bucket deduplication
//!
//! Persistence and retrieval live in [`crate::storage`]; the full ingest
//! flow is composed by [`crate::pipeline::MemoryPipeline`].

mod cleanup;
mod confidence;
mod extractor;

pub use cleanup::clean_memory_output;
pub use confidence::ConfidenceScorer;
pub use extractor::MemoryExtractor;
