//! Speech engine implementations
//!
//! The engine is the platform collaborator that actually produces audio. It
//! runs off-thread and talks back only through discrete callback events; the
//! narration controller treats those events as the sole suspension points.

pub mod espeak;
pub mod scripted;

use crate::error::NarrationError;
use crate::voices::Voice;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// One discrete request to vocalize a text.
#[derive(Debug, Clone)]
pub struct UtteranceRequest {
    /// Controller-assigned id; engine events carry it back so stale
    /// callbacks from a cancelled utterance can be ignored.
    pub utterance_id: u64,
    pub text: String,
    pub voice: Option<Voice>,
    /// Rate multiplier (1.0 = normal speed)
    pub rate: f32,
    /// Pitch (0.0-2.0, 1.0 = normal)
    pub pitch: f32,
    /// Volume (0.0-1.0)
    pub volume: f32,
}

/// Callback event reported by an engine for one utterance.
#[derive(Debug, Clone)]
pub struct EngineEvent {
    pub utterance_id: u64,
    pub kind: EngineEventKind,
}

impl EngineEvent {
    pub fn new(utterance_id: u64, kind: EngineEventKind) -> Self {
        Self { utterance_id, kind }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEventKind {
    /// Audio output began.
    Started,
    /// The utterance completed naturally.
    Ended,
    /// Pause acknowledged by the engine.
    Paused,
    /// Resume acknowledged by the engine.
    Resumed,
    /// The engine failed mid-utterance.
    Failed(String),
}

/// Trait for speech engines
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Enumerate available voices. May resolve slowly; platforms load voice
    /// lists lazily, so callers re-query rather than caching forever.
    async fn list_voices(&self) -> Result<Vec<Voice>, NarrationError>;

    /// Start vocalizing. Fire-and-forget: the engine reports progress
    /// through `events` (started, ended, failed) and never blocks the
    /// caller.
    fn speak(
        &self,
        request: UtteranceRequest,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Result<(), NarrationError>;

    /// Pause the active utterance, if any.
    fn pause(&self);

    /// Resume a paused utterance, if any.
    fn resume(&self);

    /// Cancel the active utterance. Must be a no-op when idle.
    fn cancel(&self);

    /// Check if the engine is usable on this host
    fn is_available(&self) -> bool;

    /// Get engine name
    fn name(&self) -> &str;
}
