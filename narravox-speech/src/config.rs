//! Configuration for the narration engine

use serde::{Deserialize, Serialize};

/// Playback rates exposed by the default UI surface. The controller itself
/// accepts any positive rate; this set only feeds the speed picker.
pub const RATE_PRESETS: [f32; 5] = [0.5, 0.75, 1.0, 1.25, 1.5];

/// Narration engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// Enable narration (on by default)
    pub enabled: bool,

    /// Playback rate multiplier (1.0 = normal speed)
    pub rate: f32,

    /// Pitch adjustment (0.0-2.0, default 1.0)
    pub pitch: f32,

    /// Volume (0.0-1.0, default 1.0)
    pub volume: f32,

    /// Progress tick interval in milliseconds
    pub tick_interval_ms: u64,

    /// How long the completed state holds the 100% reading before the
    /// progress display clears back to zero
    pub ended_hold_ms: u64,

    /// Language tag used by the preferred-voice policy (substring match
    /// against voice language tags)
    pub language: String,

    /// Ranked name markers for natural-sounding voices. Earlier entries win;
    /// a voice matches if its name contains the marker.
    pub preferred_markers: Vec<String>,

    /// Maximum narration text length in bytes
    pub max_text_len: usize,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            tick_interval_ms: 100,
            ended_hold_ms: 500,
            language: "en".to_string(),
            preferred_markers: vec![
                "Google".to_string(),
                "Natural".to_string(),
                "Neural".to_string(),
                "Premium".to_string(),
                "Samantha".to_string(),
            ],
            max_text_len: 100_000,
        }
    }
}

impl NarrationConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err("Rate must be a positive number".to_string());
        }

        if self.rate > 10.0 {
            return Err("Rate too large (max 10.0)".to_string());
        }

        if !(0.0..=2.0).contains(&self.pitch) {
            return Err("Pitch must be between 0.0 and 2.0".to_string());
        }

        if !(0.0..=1.0).contains(&self.volume) {
            return Err("Volume must be between 0.0 and 1.0".to_string());
        }

        if self.tick_interval_ms == 0 {
            return Err("Tick interval must be greater than 0".to_string());
        }

        if self.tick_interval_ms > 10_000 {
            return Err("Tick interval too large (max 10000 ms)".to_string());
        }

        if self.ended_hold_ms > 60_000 {
            return Err("Ended hold too large (max 60000 ms)".to_string());
        }

        if self.language.is_empty() {
            return Err("Language tag cannot be empty".to_string());
        }

        if self.language.len() > 32 {
            return Err("Language tag too long (max 32 chars)".to_string());
        }

        if !self
            .language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(
                "Language tag contains invalid characters (only alphanumeric and '-' allowed)"
                    .to_string(),
            );
        }

        for marker in &self.preferred_markers {
            if marker.is_empty() {
                return Err("Preferred voice marker cannot be empty".to_string());
            }
            if marker.len() > 256 {
                return Err("Preferred voice marker too long (max 256 chars)".to_string());
            }
        }

        if self.max_text_len == 0 {
            return Err("Max text length must be greater than 0".to_string());
        }

        Ok(())
    }
}
