//! narravox-speech: profile narration engine
//!
//! Turns a structured profile record into a spoken summary:
//! - Voice catalog with a preferred-voice selection policy
//! - Summary generator with a pluggable primary source and a deterministic
//!   local fallback
//! - Narration controller owning the playback state machine
//!   (speak/pause/resume/stop/rate changes) and progress reporting
//! - Pluggable speech engines (native espeak-ng, scripted test engine)

pub mod config;
pub mod controller;
pub mod engines;
pub mod error;
pub mod progress;
pub mod service;
pub mod summary;
pub mod voices;

pub use config::{NarrationConfig, RATE_PRESETS};
pub use controller::{NarrationController, NarrationEvent, NarrationSession, NarrationStatus};
pub use engines::{EngineEvent, EngineEventKind, SpeechEngine, UtteranceRequest};
pub use error::NarrationError;
pub use service::NarrationService;
pub use summary::{fallback_summary, ProfileSummarySource, SummaryGenerator, SummarySource, SummaryText};
pub use voices::{pick_preferred, Voice, VoiceCatalog};
