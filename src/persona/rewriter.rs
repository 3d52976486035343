//! Persona tone rewriting.
//!
//! Transforms a neutral reply into the chosen persona's voice with exactly
//! one oracle call per rewrite. The prompts are built deterministically from
//! the persona's axis profile; all prompt engineering for tone lives here.

use super::profiles::{PersonaProfile, preset_profiles};
use crate::llm::{CompletionRequest, LlmProvider};
use crate::persona::PersonaName;
use crate::Result;

const REWRITE_SYSTEM_PROMPT: &str = "You are an AI assistant that rewrites replies into a \
specific tone.\nYou will be given a base assistant reply and a persona description.\nYour job \
is to rewrite the reply to match the persona, without changing the underlying facts or \
recommendations.";

/// Applies persona-based tone to neutral replies.
pub struct PersonaRewriter<P: LlmProvider> {
    llm: P,
}

impl<P: LlmProvider> PersonaRewriter<P> {
    /// Creates a rewriter over the given provider.
    #[must_use]
    pub const fn new(llm: P) -> Self {
        Self { llm }
    }

    /// Rewrites `neutral_reply` in the style of `profile`.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's terminal error. The final reply has no
    /// fallback; a failed rewrite fails the pipeline.
    pub fn rewrite(&self, neutral_reply: &str, profile: &PersonaProfile) -> Result<String> {
        let request = CompletionRequest::new(
            Some(REWRITE_SYSTEM_PROMPT.to_string()),
            build_rewrite_prompt(neutral_reply, profile),
        )
        .with_temperature(0.7)
        .with_max_tokens(512);

        let styled = self.llm.complete(&request)?;
        Ok(styled.trim().to_string())
    }

    /// Rewrites the same neutral reply into every preset persona.
    ///
    /// Handy for before/after demos across the full preset set.
    ///
    /// # Errors
    ///
    /// Returns the first rewrite failure.
    pub fn rewrite_all(&self, neutral_reply: &str) -> Result<Vec<(PersonaName, String)>> {
        preset_profiles()
            .iter()
            .map(|profile| {
                self.rewrite(neutral_reply, profile)
                    .map(|styled| (profile.name, styled))
            })
            .collect()
    }
}

/// Builds a natural language instruction summarizing the persona's style.
fn build_style_instruction(profile: &PersonaProfile) -> String {
    let v = &profile.vector;
    let keywords = v.style_keywords().join(", ");
    let label = profile.name.as_str().replace('_', " ");

    format!(
        "You are speaking as a **{label}**.\n\
         Tone tagline: {tagline}\n\n\
         Your style guidelines:\n\
         - Stay aligned with the user's emotional safety and needs.\n\
         - Maintain the original factual content and intent of the reply.\n\
         - Only change the tone, style, and phrasing.\n\n\
         Personality axes:\n\
         - Warmth: {warmth:.2}\n\
         - Energy: {energy:.2}\n\
         - Formality: {formality:.2}\n\
         - Directness: {directness:.2}\n\
         - Humor: {humor:.2}\n\
         - Depth: {depth:.2}\n\n\
         High-level style descriptors: {keywords}\n\n\
         Key constraints:\n\
         - Do NOT introduce new facts.\n\
         - Do NOT remove important details.\n\
         - Do NOT change the user's meaning or advice content.\n\
         - Keep the reply clear, readable, and extremely concise (max 2-3 sentences).",
        tagline = profile.tagline,
        warmth = v.warmth,
        energy = v.energy,
        formality = v.formality,
        directness = v.directness,
        humor = v.humor,
        depth = v.depth,
    )
}

/// Builds the user prompt embedding the neutral reply verbatim.
fn build_rewrite_prompt(neutral_reply: &str, profile: &PersonaProfile) -> String {
    format!(
        "Below is a base assistant reply written in a neutral tone:\n\n\
         --- BASE REPLY START ---\n\
         {neutral_reply}\n\
         --- BASE REPLY END ---\n\n\
         Rewrite this reply so that it matches the persona described below, while keeping all \
         factual content and advice intact.\n\n\
         Persona description:\n\
         {style}\n\n\
         Important:\n\
         - Only output the rewritten reply text.\n\
         - Do not include explanations, notes, or metadata.\n\
         - Do not wrap the reply in quotes or markdown fences.",
        style = build_style_instruction(profile),
    )
}
