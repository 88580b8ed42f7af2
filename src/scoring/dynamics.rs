// =============================================================================
// Dynamics: Velocity and acceleration from re-scored truncations
// =============================================================================
//
// Each point is a fresh `score_timeframe` call on the window truncated to end
// `k` bars early, so dynamics always agree with what a direct call on that
// window would return.

use super::round2;
use super::timeframe::score_timeframe;
use crate::profile::EngineProfile;
use crate::types::{EnrichedCandle, TimeframeResult, TimeframeScore};

pub const DYNAMICS_POINTS: usize = 3;

/// Scores of the last `points` truncations, oldest first.
///
/// Truncations shorter than the profile's minimum history yield the neutral
/// default.
pub fn score_series(
    candles: &[EnrichedCandle],
    points: usize,
    profile: &EngineProfile,
) -> Vec<TimeframeScore> {
    (0..points)
        .rev()
        .map(|back| {
            let end = candles.len().saturating_sub(back);
            score_timeframe(&candles[..end], profile)
        })
        .collect()
}

/// Latest score plus velocity / acceleration over three points.
pub fn evaluate_timeframe(candles: &[EnrichedCandle], profile: &EngineProfile) -> TimeframeResult {
    let mut series = score_series(candles, DYNAMICS_POINTS, profile);
    let (s2, s1) = (series[0].score, series[1].score);
    let latest = series.swap_remove(2);
    let s0 = latest.score;

    let velocity = s0 - s1;
    let prev_velocity = s1 - s2;

    TimeframeResult {
        score: s0,
        velocity: round2(velocity),
        accel: round2(velocity - prev_velocity),
        reasons: latest.reasons,
        flags: latest.flags,
        breakdown: latest.breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::enrich::{attach_all, IndicatorSettings};
    use crate::types::Candle;

    fn wave(n: usize) -> Vec<EnrichedCandle> {
        let candles: Vec<Candle> = (0..n)
            .map(|i| {
                let c = 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1;
                Candle::new(c - 0.2, c + 0.6, c - 0.6, c, 500.0 + (i % 7) as f64 * 50.0)
            })
            .collect();
        attach_all(&candles, &IndicatorSettings::default())
    }

    #[test]
    fn points_match_direct_calls() {
        let profile = EngineProfile::scalp();
        let candles = wave(80);
        let series = score_series(&candles, 3, &profile);
        assert_eq!(series.len(), 3);
        assert_eq!(series[0], score_timeframe(&candles[..78], &profile));
        assert_eq!(series[1], score_timeframe(&candles[..79], &profile));
        assert_eq!(series[2], score_timeframe(&candles, &profile));
    }

    #[test]
    fn velocity_and_accel_follow_definition() {
        let profile = EngineProfile::scalp();
        let candles = wave(80);
        let series = score_series(&candles, 3, &profile);
        let result = evaluate_timeframe(&candles, &profile);
        let v0 = series[2].score - series[1].score;
        let v1 = series[1].score - series[0].score;
        assert_eq!(result.score, series[2].score);
        assert!((result.velocity - round2(v0)).abs() < 1e-10);
        assert!((result.accel - round2(v0 - v1)).abs() < 1e-10);
    }

    #[test]
    fn short_truncations_are_neutral() {
        let profile = EngineProfile::scalp();
        let candles = wave(profile.min_history);
        let series = score_series(&candles, 3, &profile);
        assert_eq!(series[0], TimeframeScore::neutral());
        assert_eq!(series[1], TimeframeScore::neutral());
        assert_ne!(series[2], TimeframeScore::neutral());
    }

    #[test]
    fn insufficient_history_has_zero_dynamics() {
        let profile = EngineProfile::scalp();
        let result = evaluate_timeframe(&wave(5), &profile);
        assert_eq!(result.score, 50.0);
        assert_eq!(result.velocity, 0.0);
        assert_eq!(result.accel, 0.0);
    }
}
