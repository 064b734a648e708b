//! Scripted in-process engine
//!
//! Produces no audio; it plays utterances against the tokio clock so the
//! full narration lifecycle can run deterministically in tests and headless
//! demos (pairs well with `tokio::time::pause`). Pausing actually stops the
//! scripted clock, so a paused utterance never reports a stale natural end.

use crate::engines::{EngineEvent, EngineEventKind, SpeechEngine, UtteranceRequest};
use crate::error::NarrationError;
use crate::voices::Voice;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Default scripted speaking speed, chosen to line up with the progress
/// estimator's 150-chars-per-60-seconds model.
const DEFAULT_CHARS_PER_SEC: f32 = 2.5;

struct ActiveUtterance {
    utterance_id: u64,
    handle: JoinHandle<()>,
    events: mpsc::UnboundedSender<EngineEvent>,
    remaining: Duration,
    started_at: Instant,
    paused: bool,
}

/// Deterministic engine for tests and demos.
pub struct ScriptedEngine {
    chars_per_sec: f32,
    voices: Vec<Voice>,
    fail: bool,
    active: Arc<Mutex<Option<ActiveUtterance>>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        let mut default_voice = Voice::new("Scripted Natural Voice", "en-US");
        default_voice.is_default = true;
        Self {
            chars_per_sec: DEFAULT_CHARS_PER_SEC,
            voices: vec![default_voice],
            fail: false,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the advertised voice list (may be empty).
    pub fn with_voices(mut self, voices: Vec<Voice>) -> Self {
        self.voices = voices;
        self
    }

    pub fn with_chars_per_sec(mut self, chars_per_sec: f32) -> Self {
        self.chars_per_sec = chars_per_sec;
        self
    }

    /// Every utterance reports Started and then Failed, for exercising the
    /// error path.
    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Number of live utterances (0 or 1). Exposed for tests asserting the
    /// single-utterance invariant.
    pub fn active_utterances(&self) -> usize {
        usize::from(self.active.lock().is_some())
    }

    fn spawn_completion(
        active: Arc<Mutex<Option<ActiveUtterance>>>,
        events: mpsc::UnboundedSender<EngineEvent>,
        utterance_id: u64,
        duration: Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let mut guard = active.lock();
            let current = matches!(
                &*guard,
                Some(a) if a.utterance_id == utterance_id && !a.paused
            );
            if current {
                let _ = events.send(EngineEvent::new(utterance_id, EngineEventKind::Ended));
                *guard = None;
            }
        })
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechEngine for ScriptedEngine {
    async fn list_voices(&self) -> Result<Vec<Voice>, NarrationError> {
        Ok(self.voices.clone())
    }

    fn speak(
        &self,
        request: UtteranceRequest,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Result<(), NarrationError> {
        let utterance_id = request.utterance_id;

        if self.fail {
            let _ = events.send(EngineEvent::new(utterance_id, EngineEventKind::Started));
            let _ = events.send(EngineEvent::new(
                utterance_id,
                EngineEventKind::Failed("scripted synthesis failure".to_string()),
            ));
            return Ok(());
        }

        let rate = if request.rate.is_finite() && request.rate > 0.0 {
            request.rate
        } else {
            1.0
        };
        let secs = request.text.chars().count() as f32 / self.chars_per_sec / rate;
        let duration = Duration::from_secs_f32(secs);

        let mut guard = self.active.lock();
        if let Some(previous) = guard.take() {
            previous.handle.abort();
        }

        let _ = events.send(EngineEvent::new(utterance_id, EngineEventKind::Started));
        debug!(utterance = utterance_id, ?duration, "scripted utterance started");

        let handle = Self::spawn_completion(
            Arc::clone(&self.active),
            events.clone(),
            utterance_id,
            duration,
        );

        *guard = Some(ActiveUtterance {
            utterance_id,
            handle,
            events,
            remaining: duration,
            started_at: Instant::now(),
            paused: false,
        });

        Ok(())
    }

    fn pause(&self) {
        let mut guard = self.active.lock();
        if let Some(a) = guard.as_mut() {
            if !a.paused {
                a.handle.abort();
                a.remaining = a.remaining.saturating_sub(a.started_at.elapsed());
                a.paused = true;
                let _ = a
                    .events
                    .send(EngineEvent::new(a.utterance_id, EngineEventKind::Paused));
            }
        }
    }

    fn resume(&self) {
        let mut guard = self.active.lock();
        if let Some(a) = guard.as_mut() {
            if a.paused {
                a.paused = false;
                a.started_at = Instant::now();
                a.handle = Self::spawn_completion(
                    Arc::clone(&self.active),
                    a.events.clone(),
                    a.utterance_id,
                    a.remaining,
                );
                let _ = a
                    .events
                    .send(EngineEvent::new(a.utterance_id, EngineEventKind::Resumed));
            }
        }
    }

    fn cancel(&self) {
        if let Some(a) = self.active.lock().take() {
            a.handle.abort();
            debug!(utterance = a.utterance_id, "scripted utterance cancelled");
        }
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
