//! Preset persona profiles.
//!
//! Three named personas, each a six-axis style vector plus a tagline. The
//! preset set is fixed; nothing here is learned or mutated at runtime.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named persona identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaName {
    /// Grounded, reassuring, structured guidance.
    CalmMentor,
    /// Supportive friend with light humor and high energy.
    WittyFriend,
    /// Soft, validating, emotionally attuned.
    Therapist,
}

impl PersonaName {
    /// The default persona used when no signal is available.
    pub const DEFAULT: Self = Self::CalmMentor;

    /// Returns the name as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CalmMentor => "calm_mentor",
            Self::WittyFriend => "witty_friend",
            Self::Therapist => "therapist",
        }
    }
}

impl fmt::Display for PersonaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonaName {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "calm_mentor" | "calm-mentor" => Ok(Self::CalmMentor),
            "witty_friend" | "witty-friend" => Ok(Self::WittyFriend),
            "therapist" => Ok(Self::Therapist),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown persona '{other}'"
            ))),
        }
    }
}

/// Numeric representation of a persona style across six axes, each in
/// `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonaVector {
    /// Colder/neutral → highly empathetic.
    pub warmth: f32,
    /// Calm/low-key → high-energy/animated.
    pub energy: f32,
    /// Casual → formal.
    pub formality: f32,
    /// Indirect/softened → direct/straightforward.
    pub directness: f32,
    /// Serious → humorous/playful.
    pub humor: f32,
    /// Surface-level → reflective/deep.
    pub depth: f32,
}

/// Axis bucket used when turning the vector into style descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisLevel {
    Low,
    Medium,
    High,
}

fn bucket(value: f32) -> AxisLevel {
    if value <= 0.33 {
        AxisLevel::Low
    } else if value >= 0.67 {
        AxisLevel::High
    } else {
        AxisLevel::Medium
    }
}

impl PersonaVector {
    /// Converts the numeric axes into high-level style descriptors for
    /// prompt construction.
    ///
    /// Deterministic: the same vector always produces the same descriptor
    /// list in the same order.
    #[must_use]
    pub fn style_keywords(&self) -> Vec<&'static str> {
        let mut keywords = Vec::with_capacity(9);

        keywords.extend(match bucket(self.warmth) {
            AxisLevel::High => vec!["warm", "empathetic"],
            AxisLevel::Medium => vec!["friendly"],
            AxisLevel::Low => vec!["reserved"],
        });
        keywords.extend(match bucket(self.energy) {
            AxisLevel::High => vec!["energetic", "enthusiastic"],
            AxisLevel::Medium => vec!["steady"],
            AxisLevel::Low => vec!["calm"],
        });
        keywords.push(match bucket(self.formality) {
            AxisLevel::High => "formal",
            AxisLevel::Medium => "semi-formal",
            AxisLevel::Low => "casual",
        });
        keywords.push(match bucket(self.directness) {
            AxisLevel::High => "direct",
            AxisLevel::Medium => "balanced",
            AxisLevel::Low => "gentle",
        });
        keywords.extend(match bucket(self.humor) {
            AxisLevel::High => vec!["humorous", "playful"],
            AxisLevel::Medium => vec!["lightly humorous"],
            AxisLevel::Low => vec!["serious"],
        });
        keywords.extend(match bucket(self.depth) {
            AxisLevel::High => vec!["reflective", "introspective"],
            AxisLevel::Medium => vec!["grounded"],
            AxisLevel::Low => vec!["lightweight"],
        });

        keywords
    }
}

/// A named persona preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaProfile {
    /// Canonical identifier.
    pub name: PersonaName,
    /// Style axes.
    pub vector: PersonaVector,
    /// One-line human-readable summary.
    pub tagline: String,
    /// Longer explanation of when this persona fits.
    pub description: String,
}

static PRESETS: Lazy<Vec<PersonaProfile>> = Lazy::new(|| {
    vec![
        PersonaProfile {
            name: PersonaName::CalmMentor,
            vector: PersonaVector {
                warmth: 0.85,
                energy: 0.35,
                formality: 0.6,
                directness: 0.8,
                humor: 0.2,
                depth: 0.9,
            },
            tagline: "Grounded, reassuring, and structured guidance.".to_string(),
            description: "Ideal for users who are stressed, overwhelmed, or seeking calm, \
                          step-by-step support."
                .to_string(),
        },
        PersonaProfile {
            name: PersonaName::WittyFriend,
            vector: PersonaVector {
                warmth: 0.9,
                energy: 0.85,
                formality: 0.15,
                directness: 0.6,
                humor: 0.95,
                depth: 0.5,
            },
            tagline: "Supportive friend with light humor and high energy.".to_string(),
            description: "Ideal for users who are excited, upbeat, or open to a more playful, \
                          conversational tone."
                .to_string(),
        },
        PersonaProfile {
            name: PersonaName::Therapist,
            vector: PersonaVector {
                warmth: 0.95,
                energy: 0.25,
                formality: 0.55,
                directness: 0.55,
                humor: 0.05,
                depth: 1.0,
            },
            tagline: "Soft, validating, and emotionally attuned.".to_string(),
            description: "Ideal for users expressing fear, sadness, or vulnerability, where \
                          emotional safety is critical."
                .to_string(),
        },
    ]
});

/// Returns all preset profiles, in a fixed order.
#[must_use]
pub fn preset_profiles() -> &'static [PersonaProfile] {
    &PRESETS
}

/// Returns the profile for a persona name.
#[must_use]
pub fn profile_for(name: PersonaName) -> &'static PersonaProfile {
    // Registry order matches the variant order; see PRESETS.
    let index = match name {
        PersonaName::CalmMentor => 0,
        PersonaName::WittyFriend => 1,
        PersonaName::Therapist => 2,
    };
    &PRESETS[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_persona_has_a_profile() {
        for name in [
            PersonaName::CalmMentor,
            PersonaName::WittyFriend,
            PersonaName::Therapist,
        ] {
            assert_eq!(profile_for(name).name, name);
        }
    }

    #[test]
    fn test_axes_within_bounds() {
        for profile in preset_profiles() {
            let v = profile.vector;
            for axis in [v.warmth, v.energy, v.formality, v.directness, v.humor, v.depth] {
                assert!((0.0..=1.0).contains(&axis));
            }
        }
    }

    #[test]
    fn test_persona_name_round_trip() {
        for name in [
            PersonaName::CalmMentor,
            PersonaName::WittyFriend,
            PersonaName::Therapist,
        ] {
            assert_eq!(name.as_str().parse::<PersonaName>().unwrap(), name);
        }
        assert!("sarcastic_uncle".parse::<PersonaName>().is_err());
    }

    #[test]
    fn test_style_keywords_deterministic() {
        let profile = profile_for(PersonaName::Therapist);
        let first = profile.vector.style_keywords();
        let second = profile.vector.style_keywords();
        assert_eq!(first, second);
        assert!(first.contains(&"warm"));
        assert!(first.contains(&"serious"));
        assert!(first.contains(&"reflective"));
    }

    #[test]
    fn test_witty_friend_keywords() {
        let keywords = profile_for(PersonaName::WittyFriend).vector.style_keywords();
        assert!(keywords.contains(&"humorous"));
        assert!(keywords.contains(&"casual"));
        assert!(keywords.contains(&"energetic"));
    }
}
