//! Core domain types.
//!
//! Memory items and their containers, emotional state, and the aggregate
//! user signal stats shared by every pipeline stage.

mod emotion;
mod memory;

pub use emotion::{EmotionalState, Sentiment, StateKind};
pub(crate) use emotion::normalize_emotion;
pub use memory::{
    ConfidenceLabel, MemoryItem, MemoryKind, MemoryOutput, UserStats, normalize_content,
};
