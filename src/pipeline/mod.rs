//! Pipeline orchestration.
//!
//! Two entry points compose the rest of the crate:
//!
//! - [`MemoryPipeline`] ingests raw user messages into cleaned, persisted
//!   memory (extract, score, dedup, save, index).
//! - [`ResponsePipeline`] answers a single message with persona-adapted tone
//!   (emotion, retrieval, neutral reply, persona selection, rewrite).
//!
//! Failure policy is per stage: context-enrichment stages (emotion,
//! retrieval, snapshot load, persistence) degrade with a warning, while the
//! stages that produce the user-visible reply fail the run.

mod ingest;
mod respond;

pub use ingest::MemoryPipeline;
pub use respond::{PipelineTrace, ResponsePipeline};
