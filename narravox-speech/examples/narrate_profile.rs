//! Narrate the bundled sample profile.

use narravox_core::ProfileRecord;
use narravox_speech::engines::espeak::EspeakEngine;
use narravox_speech::engines::scripted::ScriptedEngine;
use narravox_speech::{
    NarrationConfig, NarrationEvent, NarrationService, NarrationStatus, SpeechEngine,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let espeak = EspeakEngine::new();
    let engine: Arc<dyn SpeechEngine> = if espeak.is_available() {
        Arc::new(espeak)
    } else {
        println!("espeak-ng not found; falling back to the scripted engine");
        Arc::new(ScriptedEngine::new().with_chars_per_sec(100.0))
    };

    let service = NarrationService::new(NarrationConfig::default(), Some(engine))?;
    service.init().await?;

    if let Some(voice) = service.selected_voice() {
        println!("Using voice: {} ({})", voice.name, voice.language);
    }

    let mut events = service.subscribe();
    let profile = ProfileRecord::sample();
    let summary = service.narrate(&profile).await?;
    println!("Narrating: {}", summary.text);

    while let Ok(event) = events.recv().await {
        match event {
            NarrationEvent::Status(status) => {
                println!("status: {}", status);
                if status == NarrationStatus::Idle {
                    break;
                }
            }
            NarrationEvent::Progress(pct) => println!("progress: {:.0}%", pct),
            NarrationEvent::Summary(_) => {}
            NarrationEvent::Error(e) => {
                eprintln!("narration error: {}", e);
                break;
            }
        }
    }

    Ok(())
}
