//! Rule-based persona selection.
//!
//! A five-bucket state machine: stressed → therapist, frustrated →
//! calm mentor, excited → witty friend, neutral → calm mentor, anything
//! else → calm mentor. An explicit override bypasses the mapping entirely
//! and is always honored. Selection never fails.

use super::profiles::{PersonaName, PersonaProfile, profile_for};
use crate::models::{EmotionalState, StateKind};
use serde::{Deserialize, Serialize};

/// Result of persona selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaSelection {
    /// Chosen persona identifier.
    pub name: PersonaName,
    /// Full profile for the chosen persona.
    pub profile: PersonaProfile,
    /// Short explanation of why this persona was selected, referencing the
    /// triggering signal values.
    pub rationale: String,
}

impl PersonaSelection {
    fn new(name: PersonaName, rationale: String) -> Self {
        Self {
            name,
            profile: profile_for(name).clone(),
            rationale,
        }
    }
}

/// Selects a persona from the emotional state and an optional override.
///
/// `requested` always wins when present. An absent state falls back to the
/// default persona with a distinct "no signal" rationale.
#[must_use]
pub fn select_persona(
    emotional_state: Option<&EmotionalState>,
    requested: Option<PersonaName>,
) -> PersonaSelection {
    if let Some(name) = requested {
        return PersonaSelection::new(
            name,
            format!("User explicitly requested the '{name}' persona; override honored."),
        );
    }

    let Some(state) = emotional_state else {
        return PersonaSelection::new(
            PersonaName::DEFAULT,
            "No emotional signal available; defaulting to calm mentor.".to_string(),
        );
    };

    let signal = format!(
        "sentiment={}, emotion={}, confidence={:.2}",
        state.sentiment, state.emotion, state.confidence
    );

    match state.state {
        StateKind::Stressed => PersonaSelection::new(
            PersonaName::Therapist,
            format!(
                "Detected stressed or anxious emotional state ({signal}); using \
                 therapist-style persona for emotional safety."
            ),
        ),
        StateKind::Frustrated => PersonaSelection::new(
            PersonaName::CalmMentor,
            format!(
                "Detected frustration or anger ({signal}); using calm mentor persona to \
                 de-escalate and provide structure."
            ),
        ),
        StateKind::Excited => PersonaSelection::new(
            PersonaName::WittyFriend,
            format!(
                "Detected excited or joyful emotional state ({signal}); using witty friend \
                 persona to match positive energy."
            ),
        ),
        StateKind::Neutral => PersonaSelection::new(
            PersonaName::CalmMentor,
            format!(
                "Detected neutral emotional state ({signal}); using calm mentor persona as a \
                 balanced default."
            ),
        ),
        StateKind::Mixed => PersonaSelection::new(
            PersonaName::CalmMentor,
            format!(
                "Detected mixed or ambiguous emotional state ({signal}); using calm mentor \
                 persona as safe fallback."
            ),
        ),
    }
}
