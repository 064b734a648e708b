//! Narration service facade
//!
//! Wires the voice catalog, summary generator and narration controller
//! together behind the surface the profile page talks to: hand in a profile
//! record, get back status/progress/summary events.

use crate::config::NarrationConfig;
use crate::controller::{NarrationController, NarrationEvent, NarrationStatus};
use crate::engines::SpeechEngine;
use crate::error::NarrationError;
use crate::summary::{SummaryGenerator, SummarySource, SummaryText};
use crate::voices::{Voice, VoiceCatalog};
use narravox_core::ProfileRecord;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Facade over one narration session.
pub struct NarrationService {
    config: Arc<NarrationConfig>,
    engine: Option<Arc<dyn SpeechEngine>>,
    catalog: Arc<VoiceCatalog>,
    generator: SummaryGenerator,
    controller: Arc<NarrationController>,
    summary: RwLock<Option<SummaryText>>,
}

impl std::fmt::Debug for NarrationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrationService")
            .field("engine", &self.engine.as_ref().map(|e| e.name()))
            .finish_non_exhaustive()
    }
}

impl NarrationService {
    /// Create a service. `engine` may be absent (platform without speech
    /// synthesis); summaries still generate, but playback controls report
    /// [`NarrationError::SynthesisUnavailable`].
    pub fn new(
        config: NarrationConfig,
        engine: Option<Arc<dyn SpeechEngine>>,
    ) -> Result<Self, NarrationError> {
        config.validate().map_err(NarrationError::Config)?;

        if !config.enabled {
            return Err(NarrationError::Config(
                "Narration is disabled".to_string(),
            ));
        }

        let engine = engine.filter(|e| {
            if e.is_available() {
                true
            } else {
                warn!(engine = e.name(), "speech engine present but unavailable");
                false
            }
        });

        if engine.is_none() {
            warn!("no speech engine; narration playback disabled for this session");
        }

        let config = Arc::new(config);
        let catalog = Arc::new(VoiceCatalog::new(
            config.language.clone(),
            config.preferred_markers.clone(),
        ));
        let controller = Arc::new(NarrationController::new(Arc::clone(&config), engine.clone()));

        Ok(Self {
            config,
            engine,
            catalog,
            generator: SummaryGenerator::builtin(),
            controller,
            summary: RwLock::new(None),
        })
    }

    /// Replace the primary summary source (e.g. an external model client).
    pub fn with_source(mut self, source: Box<dyn SummarySource>) -> Self {
        self.generator = SummaryGenerator::new(source);
        self
    }

    /// Load (or re-load) the voice catalog. Safe to call again when the
    /// platform fires a voices-changed notification; the set is replaced,
    /// not merged.
    pub async fn init(&self) -> Result<(), NarrationError> {
        match &self.engine {
            Some(engine) => {
                let count = self.catalog.reload(engine.as_ref()).await?;
                info!(voices = count, "narration service initialized");
                Ok(())
            }
            None => {
                info!("narration service initialized without a speech engine");
                Ok(())
            }
        }
    }

    /// Generate a summary for `profile` and start playback.
    ///
    /// Generation failures are recovered locally through the fallback
    /// template and never surface as hard errors. When another `narrate`
    /// call has superseded this one, the late result is dropped
    /// (last-writer-wins). Playback starts automatically unless narration
    /// is already active (Speaking or Paused).
    pub async fn narrate(&self, profile: &ProfileRecord) -> Result<SummaryText, NarrationError> {
        let seq = self.generator.begin();

        let summary = match self.generator.generate(seq, profile).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("primary summary generation failed: {}; using fallback", e);
                self.generator.fallback(seq, profile)
            }
        };

        if !self.generator.is_current(seq) {
            info!(seq, "summary superseded before completion; dropping");
            return Ok(summary);
        }

        *self.summary.write() = Some(summary.clone());
        self.controller
            .publish(NarrationEvent::Summary(summary.text.clone()));

        let status = self.controller.status();
        if !matches!(status, NarrationStatus::Speaking | NarrationStatus::Paused) {
            if let Err(e) = self.speak_current() {
                // The summary itself is still good; report why playback
                // could not start and leave the caller in control.
                warn!("auto-play skipped: {}", e);
                return Err(e);
            }
        }

        Ok(summary)
    }

    /// Speak the most recently generated summary.
    pub fn speak_current(&self) -> Result<(), NarrationError> {
        if self.engine.is_none() {
            return Err(NarrationError::SynthesisUnavailable);
        }

        let voice = self
            .catalog
            .selected()
            .ok_or(NarrationError::SynthesisUnavailable)?;

        let text = self
            .summary
            .read()
            .as_ref()
            .map(|s| s.text.clone())
            .ok_or_else(|| {
                NarrationError::Config("No summary generated yet".to_string())
            })?;

        self.controller.set_voice(Some(voice));
        self.controller.speak(&text)
    }

    pub fn pause(&self) -> Result<(), NarrationError> {
        self.controller.pause()
    }

    pub fn resume(&self) -> Result<(), NarrationError> {
        self.controller.resume()
    }

    pub fn stop(&self) {
        self.controller.stop()
    }

    pub fn change_rate(&self, rate: f32) -> Result<(), NarrationError> {
        self.controller.change_rate(rate)
    }

    /// Explicit user voice selection by name.
    pub fn select_voice(&self, name: &str) -> Result<Voice, NarrationError> {
        let voice = self.catalog.select(name)?;
        self.controller.set_voice(Some(voice.clone()));
        Ok(voice)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NarrationEvent> {
        self.controller.subscribe()
    }

    pub fn status(&self) -> NarrationStatus {
        self.controller.status()
    }

    pub fn progress(&self) -> f32 {
        self.controller.progress()
    }

    /// Most recently stored summary, if any.
    pub fn summary(&self) -> Option<SummaryText> {
        self.summary.read().clone()
    }

    pub fn voices(&self) -> Vec<Voice> {
        self.catalog.voices()
    }

    pub fn selected_voice(&self) -> Option<Voice> {
        self.catalog.selected()
    }

    pub fn controller(&self) -> &Arc<NarrationController> {
        &self.controller
    }

    pub fn config(&self) -> &NarrationConfig {
        &self.config
    }
}
