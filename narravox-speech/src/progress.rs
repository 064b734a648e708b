//! Playback progress estimation
//!
//! There is no per-word feedback from the engine, so completion is estimated
//! from elapsed wall time against a duration model derived from text length:
//! `(char_count / 150) * 60` seconds at rate 1.0. The estimate is scaled
//! inversely by the playback rate; the page this was lifted from did not
//! scale by rate, which made fast playback finish well before its progress
//! bar. Scaling is the corrected behavior.

use std::time::Duration;

/// Characters per estimation block at rate 1.0.
const CHARS_PER_BLOCK: f64 = 150.0;

/// Seconds of speech per estimation block.
const SECONDS_PER_BLOCK: f64 = 60.0;

/// Estimated total utterance duration for `char_count` characters at `rate`.
///
/// A non-positive or non-finite rate is treated as 1.0 rather than producing
/// a nonsense estimate; the controller validates rates before they get here.
pub fn estimate_duration(char_count: usize, rate: f32) -> Duration {
    let rate = if rate.is_finite() && rate > 0.0 {
        rate as f64
    } else {
        1.0
    };

    let secs = (char_count as f64 / CHARS_PER_BLOCK) * SECONDS_PER_BLOCK / rate;
    Duration::from_secs_f64(secs)
}

/// Completion percentage for `elapsed` against `estimated`, clamped to
/// [0, 100]. A zero estimate (empty text) reads as complete immediately.
pub fn percent(elapsed: Duration, estimated: Duration) -> f32 {
    if estimated.is_zero() {
        return 100.0;
    }

    let pct = elapsed.as_secs_f64() / estimated.as_secs_f64() * 100.0;
    pct.clamp(0.0, 100.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_estimate_at_rate_one() {
        // 150 chars => one block => 60 seconds.
        assert_eq!(estimate_duration(150, 1.0), Duration::from_secs(60));
        assert_eq!(estimate_duration(300, 1.0), Duration::from_secs(120));
    }

    #[test]
    fn estimate_scales_inversely_with_rate() {
        let normal = estimate_duration(300, 1.0);
        let fast = estimate_duration(300, 2.0);
        let slow = estimate_duration(300, 0.5);
        assert_eq!(fast, normal / 2);
        assert_eq!(slow, normal * 2);
    }

    #[test]
    fn bad_rate_falls_back_to_normal_speed() {
        assert_eq!(estimate_duration(150, 0.0), Duration::from_secs(60));
        assert_eq!(estimate_duration(150, f32::NAN), Duration::from_secs(60));
    }

    #[test]
    fn percent_is_clamped() {
        let est = Duration::from_secs(10);
        assert_eq!(percent(Duration::ZERO, est), 0.0);
        assert_eq!(percent(Duration::from_secs(5), est), 50.0);
        assert_eq!(percent(Duration::from_secs(30), est), 100.0);
    }

    #[test]
    fn zero_estimate_reads_complete() {
        assert_eq!(percent(Duration::from_millis(1), Duration::ZERO), 100.0);
    }
}
