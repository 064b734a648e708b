//! Error types for narravox-speech

use crate::controller::NarrationStatus;
use narravox_core::Error as CoreError;
use thiserror::Error;

/// Narration subsystem errors
#[derive(Error, Debug)]
pub enum NarrationError {
    /// Summary generation failed. Recovered locally via the fallback
    /// template; the service never surfaces this as a hard failure.
    #[error("Summary generation error: {0}")]
    Generation(String),

    /// No speech engine (or no voice) is present. Surfaced once at
    /// initialization; playback controls stay disabled for the session.
    #[error("Speech synthesis unavailable")]
    SynthesisUnavailable,

    /// The engine reported a runtime failure mid-utterance.
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// An operation was not allowed in the current playback state.
    #[error("Invalid transition: {op} not allowed from {from}")]
    InvalidTransition {
        from: NarrationStatus,
        op: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl From<NarrationError> for CoreError {
    fn from(err: NarrationError) -> Self {
        CoreError::Narration(err.to_string())
    }
}
