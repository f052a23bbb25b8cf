//! Coach personality profile loaded from `personality.json`.

use std::path::Path;

use serde::Deserialize;

use crate::error::CoachError;

/// Static description of the coach persona. Never mutated after loading.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersonalityProfile {
    /// Coach name (e.g. "Coach Quinn").
    pub name: String,
    /// One-line role framing.
    pub role: String,
    /// Background blurb.
    pub background: String,
    /// Tone description.
    pub tone: String,
    /// Coaching philosophy, in order.
    pub philosophy: Vec<String>,
    /// Hard rules, in order.
    pub rules: Vec<String>,
    /// Outcome-keyed style cues.
    pub style: StyleCues,
    /// Vocabulary to weave in when fitting.
    pub vocabulary: Vec<String>,
}

/// Style cue per session outcome.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StyleCues {
    /// Cue after a good session.
    pub success: String,
    /// Cue after a missed target.
    pub failure: String,
    /// Cue when the athlete shows burnout signs.
    pub burnout: String,
}

impl PersonalityProfile {
    /// Parse a profile from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::Parse`] when a required key is missing or mistyped.
    pub fn from_json(text: &str) -> Result<Self, CoachError> {
        serde_json::from_str(text)
            .map_err(|e| CoachError::Parse(format!("invalid personality profile: {e}")))
    }

    /// Load a profile from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::Io`] if the file cannot be read, or
    /// [`CoachError::Parse`] if it is not a valid profile.
    pub fn load(path: &Path) -> Result<Self, CoachError> {
        let text = std::fs::read_to_string(path).map_err(|source| CoachError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }
}
