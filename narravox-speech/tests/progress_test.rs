//! Progress estimation tests

use narravox_speech::progress::{estimate_duration, percent};
use std::time::Duration;

#[test]
fn duration_model_is_linear_in_text_length() {
    let one = estimate_duration(150, 1.0);
    let two = estimate_duration(300, 1.0);
    let four = estimate_duration(600, 1.0);
    assert_eq!(two, one * 2);
    assert_eq!(four, two * 2);
}

#[test]
fn faster_playback_shortens_the_estimate() {
    for &rate in &[0.5f32, 0.75, 1.25, 1.5, 2.0] {
        let normal = estimate_duration(450, 1.0);
        let scaled = estimate_duration(450, rate);
        let expected = normal.as_secs_f64() / rate as f64;
        assert!((scaled.as_secs_f64() - expected).abs() < 1e-6);
    }
}

#[test]
fn percent_is_monotonic_in_elapsed_time() {
    let estimated = estimate_duration(300, 1.0);
    let mut last = -1.0f32;
    for tenths in 0..=1500 {
        let elapsed = Duration::from_millis(tenths * 100);
        let pct = percent(elapsed, estimated);
        assert!(pct >= last, "progress went backwards at {:?}", elapsed);
        assert!((0.0..=100.0).contains(&pct));
        last = pct;
    }
}

#[test]
fn halfway_through_reads_fifty_percent() {
    let estimated = estimate_duration(150, 1.0);
    assert_eq!(estimated, Duration::from_secs(60));
    assert_eq!(percent(Duration::from_secs(30), estimated), 50.0);
}

#[test]
fn empty_text_reads_complete_immediately() {
    let estimated = estimate_duration(0, 1.0);
    assert!(estimated.is_zero());
    assert_eq!(percent(Duration::ZERO, estimated), 100.0);
}
