//! Native espeak-ng engine
//!
//! Shells out to the espeak-ng binary, which is the stock synthesis path on
//! Linux. Text goes over stdin (never the argv line), the child pid is
//! tracked so cancel can kill the utterance, and pause/resume map onto
//! SIGSTOP/SIGCONT job control.

use crate::engines::{EngineEvent, EngineEventKind, SpeechEngine, UtteranceRequest};
use crate::error::NarrationError;
use crate::voices::Voice;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// espeak-ng's default speaking rate in words per minute; our rate
/// multiplier scales against it.
const BASE_WPM: f32 = 175.0;

const MAX_TEXT_LEN: usize = 100_000;

/// Engine backed by the espeak-ng command-line synthesizer.
pub struct EspeakEngine {
    available: bool,
    child_pid: Arc<Mutex<Option<u32>>>,
}

impl EspeakEngine {
    /// Probe for the espeak-ng binary. An engine is always returned; a
    /// missing binary just reports unavailable.
    pub fn new() -> Self {
        let available = std::process::Command::new("espeak-ng")
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false);

        if available {
            info!("espeak-ng engine initialized");
        } else {
            warn!("espeak-ng not found; native synthesis unavailable");
        }

        Self {
            available,
            child_pid: Arc::new(Mutex::new(None)),
        }
    }

    #[cfg(unix)]
    fn signal_child(&self, signal: i32) {
        if let Some(pid) = *self.child_pid.lock() {
            // Child pids fit in i32 on every unix we target.
            unsafe {
                libc::kill(pid as i32, signal);
            }
        }
    }
}

impl Default for EspeakEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechEngine for EspeakEngine {
    async fn list_voices(&self) -> Result<Vec<Voice>, NarrationError> {
        if !self.available {
            return Err(NarrationError::SynthesisUnavailable);
        }

        let output = Command::new("espeak-ng").arg("--voices").output().await?;
        if !output.status.success() {
            return Err(NarrationError::Synthesis(format!(
                "espeak-ng --voices failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        // Columns: Pty Language Age/Gender VoiceName File Other
        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut voices = Vec::new();
        for line in stdout.lines().skip(1) {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() >= 4 {
                voices.push(Voice {
                    name: cols[3].to_string(),
                    language: cols[1].to_string(),
                    is_default: false,
                });
            }
        }

        debug!(count = voices.len(), "espeak-ng voices enumerated");
        Ok(voices)
    }

    fn speak(
        &self,
        request: UtteranceRequest,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Result<(), NarrationError> {
        if !self.available {
            return Err(NarrationError::SynthesisUnavailable);
        }

        // Strip control characters and cap the length; the text reaches the
        // child over stdin, so this is about output hygiene, not argv.
        let text: String = request
            .text
            .chars()
            .filter(|c| !c.is_control() || *c == '\n')
            .take(MAX_TEXT_LEN)
            .collect();

        if text.is_empty() {
            return Err(NarrationError::Synthesis(
                "Text is empty after sanitization".to_string(),
            ));
        }

        let wpm = ((BASE_WPM * request.rate).round() as i64).clamp(80, 450);
        let amplitude = ((request.volume * 200.0).round() as i64).clamp(0, 200);
        let pitch = ((request.pitch * 50.0).round() as i64).clamp(0, 99);

        let mut cmd = Command::new("espeak-ng");
        cmd.arg("-s")
            .arg(wpm.to_string())
            .arg("-a")
            .arg(amplitude.to_string())
            .arg("-p")
            .arg(pitch.to_string());
        if let Some(voice) = &request.voice {
            cmd.arg("-v").arg(&voice.name);
        }
        cmd.arg("--stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let utterance_id = request.utterance_id;
        let pid_slot = Arc::clone(&self.child_pid);

        tokio::spawn(async move {
            let mut child = match cmd.spawn() {
                Ok(child) => child,
                Err(e) => {
                    let _ = events.send(EngineEvent::new(
                        utterance_id,
                        EngineEventKind::Failed(format!("Failed to run espeak-ng: {}", e)),
                    ));
                    return;
                }
            };

            let pid = child.id();
            *pid_slot.lock() = pid;

            if let Some(mut stdin) = child.stdin.take() {
                if let Err(e) = stdin.write_all(text.as_bytes()).await {
                    warn!("failed to write utterance text: {}", e);
                }
                // Dropping stdin closes the pipe so espeak-ng starts speaking.
            }

            let _ = events.send(EngineEvent::new(utterance_id, EngineEventKind::Started));

            match child.wait().await {
                Ok(status) if status.success() => {
                    let _ = events.send(EngineEvent::new(utterance_id, EngineEventKind::Ended));
                }
                Ok(status) => {
                    let _ = events.send(EngineEvent::new(
                        utterance_id,
                        EngineEventKind::Failed(format!("espeak-ng exited with {}", status)),
                    ));
                }
                Err(e) => {
                    let _ = events.send(EngineEvent::new(
                        utterance_id,
                        EngineEventKind::Failed(format!("espeak-ng wait failed: {}", e)),
                    ));
                }
            }

            let mut slot = pid_slot.lock();
            if *slot == pid {
                *slot = None;
            }
        });

        Ok(())
    }

    fn pause(&self) {
        #[cfg(unix)]
        self.signal_child(libc::SIGSTOP);
        #[cfg(not(unix))]
        warn!("pause is not supported on this platform");
    }

    fn resume(&self) {
        #[cfg(unix)]
        self.signal_child(libc::SIGCONT);
        #[cfg(not(unix))]
        warn!("resume is not supported on this platform");
    }

    fn cancel(&self) {
        #[cfg(unix)]
        {
            let pid = self.child_pid.lock().take();
            if let Some(pid) = pid {
                debug!(pid, "cancelling espeak-ng utterance");
                // A stopped child ignores SIGTERM until it is continued.
                unsafe {
                    libc::kill(pid as i32, libc::SIGCONT);
                    libc::kill(pid as i32, libc::SIGTERM);
                }
            }
        }
        #[cfg(not(unix))]
        {
            let _ = self.child_pid.lock().take();
        }
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn name(&self) -> &str {
        "espeak-ng"
    }
}
