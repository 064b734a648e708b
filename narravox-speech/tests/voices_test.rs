//! Voice catalog tests

use narravox_speech::engines::scripted::ScriptedEngine;
use narravox_speech::{Voice, VoiceCatalog};

fn markers() -> Vec<String> {
    vec!["Google".to_string(), "Natural".to_string()]
}

fn engine_with(voices: Vec<Voice>) -> ScriptedEngine {
    ScriptedEngine::new().with_voices(voices)
}

#[tokio::test]
async fn reload_picks_the_preferred_voice() {
    let engine = engine_with(vec![
        Voice::new("Basic English", "en-GB"),
        Voice::new("Google US English", "en-US"),
    ]);
    let catalog = VoiceCatalog::new("en", markers());

    let count = catalog.reload(&engine).await.unwrap();
    assert_eq!(count, 2);
    assert_eq!(catalog.selected().unwrap().name, "Google US English");
}

#[tokio::test]
async fn reload_replaces_the_voice_set() {
    let catalog = VoiceCatalog::new("en", markers());
    let first = engine_with(vec![
        Voice::new("Basic English", "en-GB"),
        Voice::new("Google US English", "en-US"),
    ]);
    catalog.reload(&first).await.unwrap();

    // A later platform reload replaces the set wholesale, never merges.
    let second = engine_with(vec![Voice::new("Natural Voice", "en-AU")]);
    let count = catalog.reload(&second).await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(catalog.voices().len(), 1);
    assert_eq!(catalog.voices()[0].name, "Natural Voice");
}

#[tokio::test]
async fn user_selection_survives_reload() {
    let catalog = VoiceCatalog::new("en", markers());
    let voices = vec![
        Voice::new("Basic English", "en-GB"),
        Voice::new("Google US English", "en-US"),
    ];
    catalog.reload(&engine_with(voices.clone())).await.unwrap();

    catalog.select("Basic English").unwrap();
    catalog.reload(&engine_with(voices)).await.unwrap();

    assert_eq!(catalog.selected().unwrap().name, "Basic English");
}

#[tokio::test]
async fn selecting_an_unknown_voice_errors() {
    let catalog = VoiceCatalog::new("en", markers());
    catalog
        .reload(&engine_with(vec![Voice::new("Basic English", "en-GB")]))
        .await
        .unwrap();

    assert!(catalog.select("No Such Voice").is_err());
    // The previous selection is untouched.
    assert_eq!(catalog.selected().unwrap().name, "Basic English");
}

#[tokio::test]
async fn empty_engine_leaves_nothing_selected() {
    let catalog = VoiceCatalog::new("en", markers());
    let count = catalog.reload(&engine_with(Vec::new())).await.unwrap();
    assert_eq!(count, 0);
    assert!(catalog.is_empty());
    assert!(catalog.selected().is_none());
}
