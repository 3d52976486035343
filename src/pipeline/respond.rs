//! Persona-adapted response pipeline.

use crate::embedding::Embedder;
use crate::emotion::EmotionEstimator;
use crate::llm::{CompletionRequest, LlmProvider};
use crate::models::{EmotionalState, MemoryItem, MemoryOutput};
use crate::persona::{PersonaName, PersonaRewriter, PersonaSelection, select_persona};
use crate::storage::{SemanticRetriever, SnapshotStore, VectorIndex};
use crate::{Error, Result};

const NEUTRAL_SYSTEM_PROMPT: &str = "You are a thoughtful assistant for a long-term companion \
system.\nYou will be given what is known about the user, followed by their latest message.\n\
Write a helpful, factual reply in a neutral tone. Do not attempt any particular personality or \
style; tone is applied in a later step.";

/// Full record of one response run, stage by stage.
///
/// Degraded stages are visible here: an absent structured snapshot, an empty
/// semantic memory list, or a `None` emotional state all mean the
/// corresponding enrichment failed or had nothing to offer.
#[derive(Debug, Clone)]
pub struct PipelineTrace {
    /// The message being answered.
    pub user_message: String,
    /// Estimated emotional state, if estimation produced a signal.
    pub emotional_state: Option<EmotionalState>,
    /// Memory items retrieved by semantic search.
    pub semantic_memory: Vec<MemoryItem>,
    /// Latest persisted memory snapshot, if one loaded.
    pub structured_memory: Option<MemoryOutput>,
    /// The tone-free base reply.
    pub neutral_reply: String,
    /// Persona chosen for the final reply.
    pub persona: PersonaSelection,
    /// The persona-styled reply shown to the user.
    pub final_reply: String,
}

/// Answers a single user message with persona-adapted tone.
///
/// Stage order: emotion estimation, semantic retrieval, snapshot load,
/// neutral reply, persona selection, rewrite. The first three degrade on
/// failure; the neutral reply and the rewrite are terminal because without
/// them there is nothing to show the user.
pub struct ResponsePipeline<P, E, S, V>
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
}

impl<P, E, S, V> ResponsePipeline<P, E, S, V>
where
    P: LlmProvider,
    E: Embedder,
    S: SnapshotStore,
    V: VectorIndex,
{
    /// Creates a pipeline over the given components.
    #[must_use]
    pub const fn new(llm: P, embedder: E, snapshots: S, index: V) -> Self {
        Self {
            llm,
            embedder,
            snapshots,
            index,
        }
    }

    /// Runs the full response flow for one message.
    ///
    /// `requested_persona` overrides emotional-state selection when present.
    /// `top_k` bounds semantic retrieval.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a blank message, and propagates
    /// failures from the neutral reply and rewrite stages.
    pub fn run(
        &self,
        user_message: &str,
        requested_persona: Option<PersonaName>,
        top_k: usize,
    ) -> Result<PipelineTrace> {
        let span = tracing::info_span!("pipeline.respond");
        let _guard = span.enter();

        if user_message.trim().is_empty() {
            return Err(Error::InvalidInput("user message is empty".to_string()));
        }

        let emotional_state = Some(EmotionEstimator::new(&self.llm).estimate(user_message));

        let retriever = SemanticRetriever::new(&self.embedder, &self.index);
        let semantic_memory = match retriever.retrieve(user_message, top_k) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, "Semantic retrieval failed; continuing without it");
                Vec::new()
            }
        };

        let structured_memory = match self.snapshots.load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "Snapshot load failed; continuing without it");
                None
            }
        };

        let neutral_reply = self.neutral_reply(
            user_message,
            &semantic_memory,
            structured_memory.as_ref(),
        )?;

        let persona = select_persona(emotional_state.as_ref(), requested_persona);
        tracing::info!(persona = %persona.name, "Selected persona");

        let final_reply =
            PersonaRewriter::new(&self.llm).rewrite(&neutral_reply, &persona.profile)?;

        metrics::counter!("pipeline_responses_total").increment(1);

        Ok(PipelineTrace {
            user_message: user_message.to_string(),
            emotional_state,
            semantic_memory,
            structured_memory,
            neutral_reply,
            persona,
            final_reply,
        })
    }

    fn neutral_reply(
        &self,
        user_message: &str,
        semantic_memory: &[MemoryItem],
        structured_memory: Option<&MemoryOutput>,
    ) -> Result<String> {
        let request = CompletionRequest::new(
            Some(NEUTRAL_SYSTEM_PROMPT.to_string()),
            build_neutral_prompt(user_message, semantic_memory, structured_memory),
        )
        .with_temperature(0.3)
        .with_max_tokens(512);

        let reply = self.llm.complete(&request)?;
        Ok(reply.trim().to_string())
    }
}

/// Builds the neutral reply prompt, enumerating known memory context.
fn build_neutral_prompt(
    user_message: &str,
    semantic_memory: &[MemoryItem],
    structured_memory: Option<&MemoryOutput>,
) -> String {
    let mut sections = Vec::new();

    if semantic_memory.is_empty() {
        sections.push("No relevant memories were found for this message.".to_string());
    } else {
        let lines = semantic_memory
            .iter()
            .map(|item| format!("- [{}] {} (confidence: {})", item.kind, item.content, item.confidence))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!(
            "Relevant things known about the user, most similar first:\n{lines}"
        ));
    }

    if let Some(memory) = structured_memory {
        if !memory.is_empty() {
            sections.push(format!(
                "The long-term profile currently holds {} preferences, {} patterns, and {} facts.",
                memory.preferences.len(),
                memory.patterns.len(),
                memory.facts.len()
            ));
        }
    }

    format!(
        "{context}\n\nThe user's latest message:\n{user_message}\n\n\
         Reply directly to the user. Be concrete and avoid filler.",
        context = sections.join("\n\n")
    )
}
