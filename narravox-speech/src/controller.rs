//! Narration controller and playback state machine
//!
//! Owns the live session state for one profile's playback lifecycle and is
//! the only component that talks to the speech engine. Engine callbacks,
//! caller operations and the progress tick all funnel into one transition
//! table here; at most one utterance and one tick timer are ever live, and
//! every exit path (natural end, failure, explicit stop, restart) tears the
//! timer down.

use crate::config::NarrationConfig;
use crate::engines::{EngineEvent, EngineEventKind, SpeechEngine, UtteranceRequest};
use crate::error::NarrationError;
use crate::progress;
use crate::voices::Voice;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Playback states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NarrationStatus {
    /// Nothing playing.
    Idle,
    /// An utterance is being vocalized.
    Speaking,
    /// Playback suspended; progress accrual is frozen.
    Paused,
    /// The utterance completed; progress holds at 100 for a short display
    /// window before clearing back to Idle.
    Ended,
    /// The engine failed mid-utterance. Recoverable: the next speak or stop
    /// leaves this state.
    Error,
}

impl fmt::Display for NarrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Speaking => write!(f, "speaking"),
            Self::Paused => write!(f, "paused"),
            Self::Ended => write!(f, "ended"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Outbound events delivered to the caller/UI.
#[derive(Debug, Clone)]
pub enum NarrationEvent {
    Status(NarrationStatus),
    /// Completion percentage in [0, 100].
    Progress(f32),
    /// A newly generated summary text.
    Summary(String),
    Error(String),
}

/// Mutable state for one narration session.
///
/// Explicitly owned by a controller rather than living in ambient global
/// state, so independent sessions can coexist (and be tested) side by side.
#[derive(Debug, Clone)]
pub struct NarrationSession {
    pub id: Uuid,
    pub status: NarrationStatus,
    pub text: String,
    pub voice: Option<Voice>,
    pub rate: f32,
    pub progress: f32,
    pub error: Option<String>,
    pub utterance_id: u64,
    pub(crate) started_at: Instant,
    pub(crate) elapsed_before_pause: Duration,
}

impl NarrationSession {
    fn new(rate: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: NarrationStatus::Idle,
            text: String::new(),
            voice: None,
            rate,
            progress: 0.0,
            error: None,
            utterance_id: 0,
            started_at: Instant::now(),
            elapsed_before_pause: Duration::ZERO,
        }
    }
}

/// Playback controller for one narration session.
pub struct NarrationController {
    config: Arc<NarrationConfig>,
    engine: Option<Arc<dyn SpeechEngine>>,
    session: Arc<RwLock<NarrationSession>>,
    events: broadcast::Sender<NarrationEvent>,
    utterance_seq: AtomicU64,
    tick_handle: Mutex<Option<JoinHandle<()>>>,
    pump_handle: Mutex<Option<JoinHandle<()>>>,
}

impl NarrationController {
    /// Create a controller. `engine` may be absent; playback operations then
    /// report [`NarrationError::SynthesisUnavailable`].
    pub fn new(config: Arc<NarrationConfig>, engine: Option<Arc<dyn SpeechEngine>>) -> Self {
        let (events, _) = broadcast::channel(256);
        let session = NarrationSession::new(config.rate);
        info!(session = %session.id, engine = engine.as_ref().map(|e| e.name()).unwrap_or("none"),
              "narration controller created");

        Self {
            config,
            engine,
            session: Arc::new(RwLock::new(session)),
            events,
            utterance_seq: AtomicU64::new(0),
            tick_handle: Mutex::new(None),
            pump_handle: Mutex::new(None),
        }
    }

    /// Subscribe to status, progress, summary and error events.
    pub fn subscribe(&self) -> broadcast::Receiver<NarrationEvent> {
        self.events.subscribe()
    }

    /// Start vocalizing `text` with the session's voice and rate.
    ///
    /// Allowed from every state; an active utterance is cancelled first, so
    /// at most one is ever live. Progress is reset to exactly 0 at the
    /// Speaking transition. Must be called from within a tokio runtime.
    pub fn speak(&self, text: &str) -> Result<(), NarrationError> {
        let engine = self
            .engine
            .as_ref()
            .filter(|e| e.is_available())
            .cloned()
            .ok_or(NarrationError::SynthesisUnavailable)?;

        if text.is_empty() {
            return Err(NarrationError::Config(
                "Narration text cannot be empty".to_string(),
            ));
        }

        if text.len() > self.config.max_text_len {
            return Err(NarrationError::Config(format!(
                "Narration text too long (max {} bytes)",
                self.config.max_text_len
            )));
        }

        // Tear down whatever is playing before starting over; a rapid double
        // speak must never leave two utterances or two tick timers live.
        engine.cancel();
        self.abort_tasks();

        let utterance_id = self.utterance_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = mpsc::unbounded_channel();

        let request = {
            let mut s = self.session.write();
            s.status = NarrationStatus::Speaking;
            s.text = text.to_string();
            s.progress = 0.0;
            s.error = None;
            s.utterance_id = utterance_id;
            s.started_at = Instant::now();
            s.elapsed_before_pause = Duration::ZERO;
            UtteranceRequest {
                utterance_id,
                text: s.text.clone(),
                voice: s.voice.clone(),
                rate: s.rate,
                pitch: self.config.pitch,
                volume: self.config.volume,
            }
        };

        debug!(utterance = utterance_id, chars = text.chars().count(), "speak");
        self.publish(NarrationEvent::Status(NarrationStatus::Speaking));
        self.publish(NarrationEvent::Progress(0.0));

        if let Err(e) = engine.speak(request, tx) {
            {
                let mut s = self.session.write();
                s.status = NarrationStatus::Error;
                s.progress = 0.0;
                s.error = Some(e.to_string());
            }
            error!(utterance = utterance_id, "engine refused utterance: {}", e);
            self.publish(NarrationEvent::Status(NarrationStatus::Error));
            self.publish(NarrationEvent::Error(e.to_string()));
            return Err(e);
        }

        self.spawn_pump(utterance_id, rx);
        self.spawn_ticker(utterance_id);
        Ok(())
    }

    /// Pause playback. Only allowed while Speaking; progress freezes at its
    /// last computed reading.
    pub fn pause(&self) -> Result<(), NarrationError> {
        {
            let mut s = self.session.write();
            if s.status != NarrationStatus::Speaking {
                return Err(NarrationError::InvalidTransition {
                    from: s.status,
                    op: "pause",
                });
            }
            let elapsed = s.started_at.elapsed();
            s.elapsed_before_pause += elapsed;
            s.status = NarrationStatus::Paused;
        }

        if let Some(engine) = &self.engine {
            engine.pause();
        }
        debug!("narration paused");
        self.publish(NarrationEvent::Status(NarrationStatus::Paused));
        Ok(())
    }

    /// Resume playback. Only allowed while Paused; elapsed-so-far is
    /// preserved, so the instantaneous progress value does not jump.
    pub fn resume(&self) -> Result<(), NarrationError> {
        let utterance_id = {
            let mut s = self.session.write();
            if s.status != NarrationStatus::Paused {
                return Err(NarrationError::InvalidTransition {
                    from: s.status,
                    op: "resume",
                });
            }
            s.started_at = Instant::now();
            s.status = NarrationStatus::Speaking;
            s.utterance_id
        };

        if let Some(engine) = &self.engine {
            engine.resume();
        }
        debug!("narration resumed");
        self.publish(NarrationEvent::Status(NarrationStatus::Speaking));
        self.spawn_ticker(utterance_id);
        Ok(())
    }

    /// Stop playback. Allowed from any state and idempotent: stopping an
    /// idle controller is a no-op, not an error.
    pub fn stop(&self) {
        if let Some(engine) = &self.engine {
            engine.cancel();
        }
        self.abort_tasks();

        let was = {
            let mut s = self.session.write();
            let was = s.status;
            s.status = NarrationStatus::Idle;
            s.progress = 0.0;
            s.error = None;
            was
        };

        if was != NarrationStatus::Idle {
            info!(from = %was, "narration stopped");
            self.publish(NarrationEvent::Status(NarrationStatus::Idle));
            self.publish(NarrationEvent::Progress(0.0));
        }
    }

    /// Update the playback rate. When an utterance is live (Speaking or
    /// Paused) there is no hot-swap on in-flight audio, so the utterance is
    /// stopped and immediately re-spoken at the new rate; the brief audible
    /// restart is an accepted trade-off.
    pub fn change_rate(&self, new_rate: f32) -> Result<(), NarrationError> {
        if !new_rate.is_finite() || new_rate <= 0.0 {
            return Err(NarrationError::Config(
                "Rate must be a positive number".to_string(),
            ));
        }

        let (active, text) = {
            let mut s = self.session.write();
            s.rate = new_rate;
            (
                matches!(s.status, NarrationStatus::Speaking | NarrationStatus::Paused),
                s.text.clone(),
            )
        };

        if active {
            info!(rate = new_rate, "restarting utterance at new rate");
            self.stop();
            self.speak(&text)?;
        }
        Ok(())
    }

    /// Set the voice used for subsequent utterances.
    pub fn set_voice(&self, voice: Option<Voice>) {
        self.session.write().voice = voice;
    }

    pub fn status(&self) -> NarrationStatus {
        self.session.read().status
    }

    pub fn progress(&self) -> f32 {
        self.session.read().progress
    }

    pub fn rate(&self) -> f32 {
        self.session.read().rate
    }

    pub fn last_error(&self) -> Option<String> {
        self.session.read().error.clone()
    }

    /// Clone of the full session state.
    pub fn snapshot(&self) -> NarrationSession {
        self.session.read().clone()
    }

    /// Whether a progress-tick timer is currently live. Exposed for tests
    /// asserting the one-timer invariant.
    pub fn has_active_ticker(&self) -> bool {
        self.tick_handle
            .lock()
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    pub(crate) fn publish(&self, event: NarrationEvent) {
        // Nobody listening is fine; events are advisory.
        let _ = self.events.send(event);
    }

    fn abort_tasks(&self) {
        if let Some(handle) = self.tick_handle.lock().take() {
            handle.abort();
        }
        if let Some(handle) = self.pump_handle.lock().take() {
            handle.abort();
        }
    }

    /// Consume engine callbacks for one utterance and apply the resulting
    /// transitions. Events tagged with a different utterance id are stale
    /// (from a cancelled utterance whose engine resolved late) and ignored.
    fn spawn_pump(&self, utterance_id: u64, mut rx: mpsc::UnboundedReceiver<EngineEvent>) {
        let session = Arc::clone(&self.session);
        let events = self.events.clone();
        let hold = Duration::from_millis(self.config.ended_hold_ms);

        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if event.utterance_id != utterance_id {
                    debug!(
                        got = event.utterance_id,
                        want = utterance_id,
                        "ignoring stale engine event"
                    );
                    continue;
                }

                match event.kind {
                    EngineEventKind::Started => {
                        debug!(utterance = utterance_id, "engine started")
                    }
                    EngineEventKind::Paused => {
                        debug!(utterance = utterance_id, "engine acknowledged pause")
                    }
                    EngineEventKind::Resumed => {
                        debug!(utterance = utterance_id, "engine acknowledged resume")
                    }
                    EngineEventKind::Ended => {
                        {
                            let mut s = session.write();
                            if s.utterance_id != utterance_id
                                || s.status != NarrationStatus::Speaking
                            {
                                break;
                            }
                            s.status = NarrationStatus::Ended;
                            s.progress = 100.0;
                        }
                        debug!(utterance = utterance_id, "utterance ended");
                        let _ = events.send(NarrationEvent::Status(NarrationStatus::Ended));
                        let _ = events.send(NarrationEvent::Progress(100.0));

                        // Short display hold at 100%, then the progress
                        // reading clears and the session returns to Idle.
                        tokio::time::sleep(hold).await;
                        {
                            let mut s = session.write();
                            if s.utterance_id != utterance_id
                                || s.status != NarrationStatus::Ended
                            {
                                break;
                            }
                            s.status = NarrationStatus::Idle;
                            s.progress = 0.0;
                        }
                        let _ = events.send(NarrationEvent::Status(NarrationStatus::Idle));
                        let _ = events.send(NarrationEvent::Progress(0.0));
                        break;
                    }
                    EngineEventKind::Failed(message) => {
                        {
                            let mut s = session.write();
                            if s.utterance_id != utterance_id {
                                break;
                            }
                            s.status = NarrationStatus::Error;
                            s.progress = 0.0;
                            s.error = Some(message.clone());
                        }
                        error!(utterance = utterance_id, "synthesis failed: {}", message);
                        let _ = events.send(NarrationEvent::Status(NarrationStatus::Error));
                        let _ = events.send(NarrationEvent::Error(message));
                        let _ = events.send(NarrationEvent::Progress(0.0));
                        break;
                    }
                }
            }
        });

        if let Some(old) = self.pump_handle.lock().replace(handle) {
            old.abort();
        }
    }

    /// Publish an estimated completion percentage on a fixed tick while the
    /// session is Speaking. The task checks status under the session lock
    /// before publishing, so it can never emit a reading for a state it has
    /// already left.
    fn spawn_ticker(&self, utterance_id: u64) {
        let session = Arc::clone(&self.session);
        let events = self.events.clone();
        let interval = Duration::from_millis(self.config.tick_interval_ms);

        let handle = tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tick.tick().await;
                let pct = {
                    let mut s = session.write();
                    if s.utterance_id != utterance_id || s.status != NarrationStatus::Speaking {
                        break;
                    }
                    let estimated = progress::estimate_duration(s.text.chars().count(), s.rate);
                    let elapsed = s.elapsed_before_pause + s.started_at.elapsed();
                    s.progress = progress::percent(elapsed, estimated);
                    s.progress
                };
                let _ = events.send(NarrationEvent::Progress(pct));
            }
        });

        if let Some(old) = self.tick_handle.lock().replace(handle) {
            old.abort();
        }
    }
}

impl Drop for NarrationController {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}
