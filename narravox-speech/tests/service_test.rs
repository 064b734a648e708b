//! Narration service tests

use async_trait::async_trait;
use narravox_core::ProfileRecord;
use narravox_speech::engines::scripted::ScriptedEngine;
use narravox_speech::{
    NarrationConfig, NarrationError, NarrationEvent, NarrationService, NarrationStatus,
    SpeechEngine, SummarySource,
};
use std::sync::Arc;

struct FailingSource;

#[async_trait]
impl SummarySource for FailingSource {
    async fn generate(&self, _profile: &ProfileRecord) -> Result<String, NarrationError> {
        Err(NarrationError::Generation("model offline".to_string()))
    }
}

fn scripted_service() -> NarrationService {
    let engine = Arc::new(ScriptedEngine::new()) as Arc<dyn SpeechEngine>;
    NarrationService::new(NarrationConfig::default(), Some(engine))
        .expect("default config is valid")
}

#[tokio::test(start_paused = true)]
async fn narrate_generates_and_autoplays() {
    let service = scripted_service();
    service.init().await.unwrap();

    let summary = service.narrate(&ProfileRecord::sample()).await.unwrap();
    assert!(!summary.via_fallback);
    assert!(summary.text.contains("Alex Johnson"));

    assert_eq!(service.status(), NarrationStatus::Speaking);
    assert_eq!(service.summary().unwrap().text, summary.text);
    assert_eq!(service.selected_voice().unwrap().name, "Scripted Natural Voice");
}

#[tokio::test(start_paused = true)]
async fn narrate_while_active_updates_summary_without_restarting() {
    let service = scripted_service();
    service.init().await.unwrap();

    service.narrate(&ProfileRecord::sample()).await.unwrap();
    let first_utterance = service.controller().snapshot().utterance_id;

    let mut other = ProfileRecord::sample();
    other.name = "Casey Kim".to_string();
    let summary = service.narrate(&other).await.unwrap();

    assert!(summary.text.contains("Casey Kim"));
    assert_eq!(service.summary().unwrap().text, summary.text);
    // Playback keeps running the utterance that was already active.
    assert_eq!(service.status(), NarrationStatus::Speaking);
    assert_eq!(service.controller().snapshot().utterance_id, first_utterance);
}

#[tokio::test(start_paused = true)]
async fn failing_primary_source_recovers_through_fallback() {
    let engine = Arc::new(ScriptedEngine::new()) as Arc<dyn SpeechEngine>;
    let service = NarrationService::new(NarrationConfig::default(), Some(engine))
        .unwrap()
        .with_source(Box::new(FailingSource));
    service.init().await.unwrap();

    let summary = service.narrate(&ProfileRecord::sample()).await.unwrap();
    assert!(summary.via_fallback);
    assert!(summary.text.contains("Alex Johnson"));
    assert_eq!(service.status(), NarrationStatus::Speaking);
}

#[tokio::test(start_paused = true)]
async fn empty_voice_catalog_disables_playback() {
    let engine = Arc::new(ScriptedEngine::new().with_voices(Vec::new())) as Arc<dyn SpeechEngine>;
    let service = NarrationService::new(NarrationConfig::default(), Some(engine)).unwrap();
    service.init().await.unwrap();

    let err = service.narrate(&ProfileRecord::sample()).await.unwrap_err();
    assert!(matches!(err, NarrationError::SynthesisUnavailable));

    // The summary itself still generated and is kept around.
    assert!(service.summary().is_some());
    assert_eq!(service.status(), NarrationStatus::Idle);
    assert!(!service.controller().has_active_ticker());
}

#[tokio::test]
async fn disabled_narration_is_rejected_at_construction() {
    let mut config = NarrationConfig::default();
    config.enabled = false;
    let engine = Arc::new(ScriptedEngine::new()) as Arc<dyn SpeechEngine>;

    let err = NarrationService::new(config, Some(engine)).unwrap_err();
    assert!(matches!(err, NarrationError::Config(_)));
}

#[tokio::test(start_paused = true)]
async fn select_voice_flows_through_to_the_session() {
    let voices = vec![
        narravox_speech::Voice::new("Scripted Natural Voice", "en-US"),
        narravox_speech::Voice::new("Scripted Calm Voice", "en-GB"),
    ];
    let engine = Arc::new(ScriptedEngine::new().with_voices(voices)) as Arc<dyn SpeechEngine>;
    let service = NarrationService::new(NarrationConfig::default(), Some(engine)).unwrap();
    service.init().await.unwrap();

    let picked = service.select_voice("Scripted Calm Voice").unwrap();
    assert_eq!(picked.name, "Scripted Calm Voice");
    assert_eq!(
        service.controller().snapshot().voice.unwrap().name,
        "Scripted Calm Voice"
    );

    assert!(service.select_voice("No Such Voice").is_err());
}

#[tokio::test(start_paused = true)]
async fn subscribers_receive_summary_before_playback_events() {
    let service = scripted_service();
    service.init().await.unwrap();

    let mut events = service.subscribe();
    service.narrate(&ProfileRecord::sample()).await.unwrap();

    let first = events.recv().await.unwrap();
    let text = match first {
        NarrationEvent::Summary(text) => text,
        other => panic!("expected a summary event, got {:?}", other),
    };
    assert!(text.contains("Alex Johnson"));

    let second = events.recv().await.unwrap();
    assert!(matches!(
        second,
        NarrationEvent::Status(NarrationStatus::Speaking)
    ));
    let third = events.recv().await.unwrap();
    assert!(matches!(third, NarrationEvent::Progress(p) if p == 0.0));
}
