use crate::error::IntrospectError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tone of the guide. Selects exactly one instruction block in the system prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Socratic,
    Warm,
    Challenger,
}

impl Style {
    pub const ALL: [Style; 3] = [Style::Socratic, Style::Warm, Style::Challenger];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Socratic => "socratic",
            Self::Warm => "warm",
            Self::Challenger => "challenger",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Socratic => "Socratic Guide",
            Self::Warm => "Warm Therapist",
            Self::Challenger => "Direct Challenger",
        }
    }

    /// The tonal block appended after the shared base instructions.
    pub fn instructions(&self) -> &'static str {
        match self {
            Self::Socratic => SOCRATIC,
            Self::Warm => WARM,
            Self::Challenger => CHALLENGER,
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Style {
    type Err = IntrospectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "socratic" => Ok(Self::Socratic),
            "warm" => Ok(Self::Warm),
            "challenger" => Ok(Self::Challenger),
            other => Err(IntrospectError::Config(format!(
                "Unknown style `{other}` (expected socratic, warm or challenger)"
            ))),
        }
    }
}

const SOCRATIC: &str = "\
You are a calm Socratic guide helping someone explore their thoughts through careful questioning.

Your tone: calm, curious, non-judgmental, gently probing.

When you sense they have reached an insight, ask if they would like to capture it.";

const WARM: &str = "\
You are a warm, empathetic therapist guiding someone through self-reflection.

Your tone: warm, nurturing, validating feelings before exploring them.

When you sense they have reached an insight, warmly ask if they would like to capture it.";

const CHALLENGER: &str = "\
You are a direct challenger helping someone examine their assumptions.

Your tone: direct, incisive, thought-provoking, quick to spot contradictions.

When you sense they have reached an insight, ask if they would like to capture it.";
