//! Voice catalog and preferred-voice selection
//!
//! Voices are supplied by the platform engine and may load asynchronously
//! after the catalog is first queried. Reloads replace the voice set
//! wholesale (never merge) and re-run the preference policy only when no
//! voice is currently selected.

use crate::engines::SpeechEngine;
use crate::error::NarrationError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One synthesis voice as reported by the platform engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    /// Voice identifier (platform-specific name)
    pub name: String,
    /// Language tag (e.g. "en-US", "en", "es")
    pub language: String,
    /// Whether the engine marks this voice as its default
    pub is_default: bool,
}

impl Voice {
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
            is_default: false,
        }
    }
}

/// Preferred-voice policy.
///
/// Markers are ranked: the first marker with any match wins. A voice matches
/// a marker when its language tag contains `language` and its name contains
/// the marker. Falls back to the first language-matching voice, then to the
/// first voice at all, then to `None` (narration disabled).
pub fn pick_preferred(voices: &[Voice], language: &str, markers: &[String]) -> Option<Voice> {
    for marker in markers {
        if let Some(v) = voices
            .iter()
            .find(|v| v.language.contains(language) && v.name.contains(marker.as_str()))
        {
            return Some(v.clone());
        }
    }

    if let Some(v) = voices.iter().find(|v| v.language.contains(language)) {
        return Some(v.clone());
    }

    voices.first().cloned()
}

/// Catalog of available voices plus the current selection.
///
/// Read-mostly shared state: the only writers are [`VoiceCatalog::reload`]
/// and explicit user selection, both of which build the new value before
/// publishing it.
pub struct VoiceCatalog {
    voices: RwLock<Vec<Voice>>,
    selected: RwLock<Option<Voice>>,
    language: String,
    markers: Vec<String>,
}

impl VoiceCatalog {
    pub fn new(language: impl Into<String>, markers: Vec<String>) -> Self {
        Self {
            voices: RwLock::new(Vec::new()),
            selected: RwLock::new(None),
            language: language.into(),
            markers,
        }
    }

    /// Re-query the engine and replace the voice set.
    ///
    /// The preference policy runs only if nothing is selected yet, so an
    /// explicit user choice survives platform voice reloads.
    pub async fn reload(&self, engine: &dyn SpeechEngine) -> Result<usize, NarrationError> {
        let voices = engine.list_voices().await?;
        debug!(count = voices.len(), engine = engine.name(), "loaded voices");

        *self.voices.write() = voices.clone();

        let mut selected = self.selected.write();
        if selected.is_none() {
            *selected = pick_preferred(&voices, &self.language, &self.markers);
            match &*selected {
                Some(v) => info!(voice = %v.name, language = %v.language, "selected preferred voice"),
                None => warn!("no voices available; narration disabled"),
            }
        }

        Ok(self.voices.read().len())
    }

    /// Explicit user voice selection by name.
    pub fn select(&self, name: &str) -> Result<Voice, NarrationError> {
        let voice = self
            .voices
            .read()
            .iter()
            .find(|v| v.name == name)
            .cloned()
            .ok_or_else(|| NarrationError::Config(format!("Unknown voice: {}", name)))?;

        *self.selected.write() = Some(voice.clone());
        info!(voice = %voice.name, "voice selected");
        Ok(voice)
    }

    /// Current selection, if any.
    pub fn selected(&self) -> Option<Voice> {
        self.selected.read().clone()
    }

    /// Snapshot of the known voices.
    pub fn voices(&self) -> Vec<Voice> {
        self.voices.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> Vec<String> {
        vec!["Google".to_string(), "Natural".to_string()]
    }

    #[test]
    fn ranked_marker_wins_over_list_order() {
        let voices = vec![
            Voice::new("Basic English", "en-GB"),
            Voice::new("Natural Voice", "en-US"),
            Voice::new("Google US English", "en-US"),
        ];
        // "Google" is ranked first even though "Natural Voice" appears earlier.
        let picked = pick_preferred(&voices, "en", &markers()).unwrap();
        assert_eq!(picked.name, "Google US English");
    }

    #[test]
    fn falls_back_to_first_english_voice() {
        let voices = vec![
            Voice::new("Hortense", "fr-FR"),
            Voice::new("Basic English", "en-GB"),
        ];
        let picked = pick_preferred(&voices, "en", &markers()).unwrap();
        assert_eq!(picked.name, "Basic English");
    }

    #[test]
    fn falls_back_to_first_voice_when_no_english() {
        let voices = vec![Voice::new("Hortense", "fr-FR"), Voice::new("Anna", "de-DE")];
        let picked = pick_preferred(&voices, "en", &markers()).unwrap();
        assert_eq!(picked.name, "Hortense");
    }

    #[test]
    fn empty_list_yields_none() {
        assert!(pick_preferred(&[], "en", &markers()).is_none());
    }
}
