//! Persona selection and tone rewriting.
//!
//! Personas are fixed, named six-axis style presets. Selection is a pure
//! function of emotional state (or an explicit override) and never fails;
//! the rewriter then applies the chosen style to a neutral reply with one
//! oracle call.

mod profiles;
mod rewriter;
mod selector;

pub use profiles::{PersonaName, PersonaProfile, PersonaVector, preset_profiles, profile_for};
pub use rewriter::PersonaRewriter;
pub use selector::{PersonaSelection, select_persona};
