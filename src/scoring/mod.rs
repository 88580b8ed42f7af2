// =============================================================================
// Timeframe Scoring Module
// =============================================================================
//
// Per-timeframe pipeline:
// - Candle-structure score (bodies, ranges, EMA/VWAP structure, patterns)
// - RSI trio score (fast / regular / slow RSI levels and slopes)
// - MACD score (histogram sign, momentum, cross proximity)
// - Guardrails (caps, floors, dampeners)
// - Dynamics (velocity / acceleration over trailing truncations)
//
// Every sub-score is a raw value in [-1, 1] rescaled to [0, 100].

pub mod candle_engine;
pub mod dynamics;
pub mod guardrails;
pub mod macd_score;
pub mod rsi_trio;
pub mod timeframe;

pub use dynamics::{evaluate_timeframe, score_series};
pub use timeframe::score_timeframe;

/// A sub-score with the reasons it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SubScore {
    pub score: f64,
    pub reasons: Vec<String>,
}

impl SubScore {
    pub(crate) fn neutral(reason: &str) -> Self {
        Self {
            score: 50.0,
            reasons: vec![reason.to_string()],
        }
    }
}

pub(crate) fn clip(x: f64, lo: f64, hi: f64) -> f64 {
    x.max(lo).min(hi)
}

/// -1, 0 or +1.
pub(crate) fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Clamp a raw value to [-1, 1] and rescale to [0, 100].
pub(crate) fn to_score(raw: f64) -> f64 {
    round2(50.0 * (clip(raw, -1.0, 1.0) + 1.0))
}

/// Median of `values`; 0.0 for an empty slice.
pub(crate) fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        0.5 * (sorted[mid - 1] + sorted[mid])
    }
}

/// Push `reason` when `cond` holds.
pub(crate) fn note(reasons: &mut Vec<String>, cond: bool, reason: &str) {
    if cond {
        reasons.push(reason.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_score_rescales_and_clamps() {
        assert_eq!(to_score(0.0), 50.0);
        assert_eq!(to_score(1.0), 100.0);
        assert_eq!(to_score(-3.0), 0.0);
        assert_eq!(to_score(0.5), 75.0);
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn sign_of_zero_is_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.1), -1.0);
        assert_eq!(sign(7.0), 1.0);
    }
}
