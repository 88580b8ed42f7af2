// =============================================================================
// Candle Engine: Structure score from the last three bars
// =============================================================================
//
// Terms (each roughly in [-1, 1]):
//   body          ATR-normalised body deltas, 0.2 / 0.3 / 0.5 weighted, tanh'd
//   range         last range vs EMA of recent ranges, signed by direction
//   wicks         (lower wick - upper wick) / range
//   ema stack     close vs EMA9 vs EMA20 ordering
//   ema slope     EMA9 change over the window, ATR-normalised
//   ema distance  close vs EMA20 in basis points
//   ema cross     EMA9/EMA20 crossing inside the window
//   vwap          position vs VWAP anchor, plus reclaim / loss crossing
//   pattern       light points per candle type
//   long stack    close vs EMA50 vs EMA200 ordering
//
// The weighted sum is scaled by a volume-participation multiplier in
// [0.90, 1.12], clamped to [-1, 1] and rescaled to [0, 100]. A term whose
// inputs have not warmed up contributes 0.

use super::{clip, note, sign, to_score, SubScore};
use crate::indicators::atr::trailing_atr;
use crate::indicators::ema::ema;
use crate::profile::EngineProfile;
use crate::types::{CandleType, EnrichedCandle, Ohlcv};

const ATR_FLOOR: f64 = 1e-6;
const RANGE_FLOOR: f64 = 1e-6;
const PRICE_FLOOR: f64 = 1e-9;
const CROSS_POINTS: f64 = 0.30;

fn pattern_points(kind: CandleType) -> f64 {
    match kind {
        CandleType::BullishMarubozu => 0.60,
        CandleType::BearishMarubozu => -0.60,
        CandleType::Hammer => 0.50,
        CandleType::HangingMan => -0.50,
        CandleType::InvertedHammer => 0.40,
        CandleType::ShootingStar => -0.40,
        CandleType::SpinningTop => -0.20,
        CandleType::Doji | CandleType::Bullish | CandleType::Bearish => 0.0,
    }
}

/// Volume-participation multiplier from volume / EMA(volume).
fn volume_multiplier(vol_ratio: f64) -> f64 {
    let ratio = clip(vol_ratio, 0.5, 3.0);
    let mult = if ratio <= 1.0 {
        0.92 + 0.08 * (ratio - 0.5) / 0.5
    } else if ratio <= 2.0 {
        1.00 + 0.08 * (ratio - 1.0)
    } else {
        1.08 + 0.04 * (ratio - 2.0)
    };
    clip(mult, 0.90, 1.12)
}

/// Ordering of `close` against a fast and a slow reference.
///
/// +1 / -1 for a full stack, +/-`partial` when price is merely above / below both.
fn stack(close: f64, fast: Option<f64>, slow: Option<f64>, partial: f64) -> f64 {
    let (Some(fast), Some(slow)) = (fast, slow) else {
        return 0.0;
    };
    if close > fast && fast > slow {
        1.0
    } else if close < fast && fast < slow {
        -1.0
    } else if close > fast && close > slow {
        partial
    } else if close < fast && close < slow {
        -partial
    } else {
        0.0
    }
}

/// +CROSS_POINTS when `before <= 0 < after`, mirrored for the downside.
fn crossing(before: Option<f64>, after: Option<f64>) -> f64 {
    match (before, after) {
        (Some(b), Some(a)) if b <= 0.0 && a > 0.0 => CROSS_POINTS,
        (Some(b), Some(a)) if b >= 0.0 && a < 0.0 => -CROSS_POINTS,
        _ => 0.0,
    }
}

fn diff(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? - b?)
}

pub fn candle_structure_score(candles: &[EnrichedCandle], profile: &EngineProfile) -> SubScore {
    let n = candles.len();
    if n < 3 {
        return SubScore::neutral("candle_engine_neutral");
    }

    let cfg = &profile.candle;
    let w = &cfg.weights;
    let use_session = profile.use_session_vwap;

    // --- Baselines -----------------------------------------------------------
    let atr = trailing_atr(candles, cfg.atr_len).unwrap_or(0.0).max(ATR_FLOOR);
    let volumes: Vec<f64> = candles.iter().map(Ohlcv::volume).collect();
    let vol_ema = ema(&volumes, cfg.volume_ema_len);

    let (c2, c1, c0) = (&candles[n - 3], &candles[n - 2], &candles[n - 1]);
    let close = c0.close();

    // --- 1) Body momentum ----------------------------------------------------
    let body_norm = |c: &EnrichedCandle| ((c.close() - c.open()) / (atr * 0.8)).tanh();
    let (bm2, bm1, bm0) = (body_norm(c2), body_norm(c1), body_norm(c0));
    let body_momentum = 0.2 * bm2 + 0.3 * bm1 + 0.5 * bm0;

    let mut growth = 0.0;
    if bm2 < bm1 && bm1 < bm0 && bm0 > 0.0 {
        growth += cfg.growth_accent;
    }
    if bm2 > bm1 && bm1 > bm0 && bm0 < 0.0 {
        growth -= cfg.growth_accent;
    }

    // --- 2) Range expansion --------------------------------------------------
    let ranges: Vec<f64> = candles[n.saturating_sub(cfg.range_window)..]
        .iter()
        .map(Ohlcv::range)
        .collect();
    let range_mean = ranges.iter().sum::<f64>() / ranges.len().max(1) as f64;
    let range_ema = ema(&ranges, cfg.range_ema_len).unwrap_or(range_mean).max(RANGE_FLOOR);
    let last_range = c0.range().max(RANGE_FLOOR);
    let expansion = (last_range / range_ema - 1.0).tanh() * sign(close - c0.open());

    // --- 3) Wick quality -----------------------------------------------------
    let r0 = c0.range().max(PRICE_FLOOR);
    let upper0 = c0.high() - c0.open().max(close);
    let lower0 = c0.open().min(close) - c0.low();
    let wick_quality = clip((lower0 - upper0) / r0, -1.0, 1.0);

    // --- 4) EMA structure ----------------------------------------------------
    let ema_stack = stack(close, c0.ema9, c0.ema20, cfg.partial_stack);
    let ema_slope = diff(c0.ema9, c2.ema9).map_or(0.0, |d| (d / (atr * 0.5)).tanh());
    let ema_distance = c0.ema20.map_or(0.0, |e20| {
        let bp = 10_000.0 * (close - e20) / e20.max(PRICE_FLOOR);
        (bp / 60.0).tanh()
    });
    let long_stack = stack(close, c0.ema50, c0.ema200, cfg.partial_stack);

    // --- 5) EMA9 / EMA20 cross inside the window -----------------------------
    let ema_cross = crossing(diff(c2.ema9, c2.ema20), diff(c0.ema9, c0.ema20));

    // --- 6) VWAP position and reclaim ----------------------------------------
    let anchor0 = c0.anchor_vwap(use_session);
    let vwap_position = anchor0.map_or(0.0, |v| {
        let bp = 10_000.0 * (close - v) / v.max(PRICE_FLOOR);
        (bp / 50.0).tanh()
    });
    let pv2 = c2.anchor_vwap(use_session).map(|v| c2.close() - v);
    let pv0 = anchor0.map(|v| close - v);
    let vwap_reclaim = crossing(pv2, pv0);

    // --- 7) Pattern ----------------------------------------------------------
    let pattern = clip(pattern_points(c0.candle_type), -1.0, 1.0);

    // --- Weighted sum ---------------------------------------------------------
    let raw = w.body * body_momentum
        + w.range_expansion * expansion
        + w.wicks * wick_quality
        + w.ema_stack * ema_stack
        + w.ema_distance * ema_distance
        + w.ema_slope * ema_slope
        + w.ema_cross * ema_cross
        + w.vwap_position * vwap_position
        + w.vwap_reclaim * vwap_reclaim
        + w.pattern * pattern
        + w.long_stack * long_stack
        + growth;

    let vol_ratio = match vol_ema {
        Some(base) if base > 0.0 => c0.volume() / base,
        _ => 1.0,
    };
    let score = to_score(raw * volume_multiplier(vol_ratio));

    let mut reasons = Vec::new();
    note(&mut reasons, ema_stack > 0.8, "EMA9>EMA20 with price above");
    note(&mut reasons, ema_stack < -0.8, "Below EMA9 & EMA20");
    if w.long_stack > 0.0 {
        note(&mut reasons, long_stack > 0.8, "EMA50>EMA200 with price above");
        note(&mut reasons, long_stack < -0.8, "Below EMA50 & EMA200");
    }
    note(&mut reasons, ema_cross > 0.25, "EMA9 up-crossed EMA20");
    note(&mut reasons, ema_cross < -0.25, "EMA9 down-crossed EMA20");
    note(&mut reasons, vwap_reclaim > 0.25, "VWAP reclaim");
    note(&mut reasons, vwap_reclaim < -0.25, "VWAP loss");
    note(&mut reasons, expansion > 0.2, "Range expanding upward");
    note(&mut reasons, expansion < -0.2, "Range expanding downward");
    note(&mut reasons, pattern > 0.4, "Bullish pattern");
    note(&mut reasons, pattern < -0.4, "Bearish pattern");
    note(&mut reasons, vol_ratio >= 1.5, "Above-average volume");
    note(&mut reasons, vol_ratio <= 0.7, "Subdued volume");

    SubScore { score, reasons }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::enrich::{attach_all, IndicatorSettings};
    use crate::types::Candle;

    fn trend(n: usize, step: f64) -> Vec<EnrichedCandle> {
        let candles: Vec<Candle> = (0..n)
            .map(|i| {
                let open = 100.0 + i as f64 * step;
                let close = open + step * 0.8;
                let (lo, hi) = if close >= open { (open, close) } else { (close, open) };
                Candle::new(open, hi + 0.1, lo - 0.1, close, 1_000.0)
            })
            .collect();
        attach_all(&candles, &IndicatorSettings::default())
    }

    #[test]
    fn volume_multiplier_bounds() {
        assert!((volume_multiplier(0.1) - 0.92).abs() < 1e-12);
        assert!((volume_multiplier(1.0) - 1.00).abs() < 1e-12);
        assert!((volume_multiplier(2.0) - 1.08).abs() < 1e-12);
        assert!((volume_multiplier(10.0) - 1.12).abs() < 1e-12);
    }

    #[test]
    fn stack_levels() {
        assert_eq!(stack(12.0, Some(11.0), Some(10.0), 0.4), 1.0);
        assert_eq!(stack(9.0, Some(10.0), Some(11.0), 0.4), -1.0);
        assert_eq!(stack(12.0, Some(10.0), Some(11.0), 0.4), 0.4);
        assert_eq!(stack(8.0, Some(10.0), Some(9.0), 0.4), -0.4);
        assert_eq!(stack(12.0, None, Some(11.0), 0.4), 0.0);
    }

    #[test]
    fn swing_ignores_unordered_stacks() {
        let swing = EngineProfile::swing().candle.partial_stack;
        let scalp = EngineProfile::scalp().candle.partial_stack;
        assert_eq!(stack(12.0, Some(10.0), Some(11.0), swing), 0.0);
        assert_eq!(stack(8.0, Some(10.0), Some(9.0), swing), 0.0);
        assert_eq!(stack(12.0, Some(11.0), Some(10.0), swing), 1.0);
        assert_eq!(stack(12.0, Some(10.0), Some(11.0), scalp), 0.4);
    }

    #[test]
    fn crossing_detects_both_directions() {
        assert_eq!(crossing(Some(-1.0), Some(0.5)), CROSS_POINTS);
        assert_eq!(crossing(Some(0.0), Some(-0.5)), -CROSS_POINTS);
        assert_eq!(crossing(Some(1.0), Some(0.5)), 0.0);
        assert_eq!(crossing(None, Some(0.5)), 0.0);
    }

    #[test]
    fn uptrend_scores_above_neutral() {
        let candles = trend(60, 1.0);
        let out = candle_structure_score(&candles, &EngineProfile::scalp());
        assert!(out.score > 60.0, "uptrend score {}", out.score);
        assert!(out.reasons.iter().any(|r| r == "EMA9>EMA20 with price above"));
    }

    #[test]
    fn downtrend_scores_below_neutral() {
        let candles = trend(60, -1.0);
        let out = candle_structure_score(&candles, &EngineProfile::scalp());
        assert!(out.score < 40.0, "downtrend score {}", out.score);
        assert!(out.reasons.iter().any(|r| r == "Below EMA9 & EMA20"));
    }

    #[test]
    fn swing_profile_reads_long_stack() {
        let candles = trend(260, 1.0);
        let out = candle_structure_score(&candles, &EngineProfile::swing());
        assert!(out.reasons.iter().any(|r| r == "EMA50>EMA200 with price above"));
    }

    #[test]
    fn flat_window_is_bounded() {
        let flat = vec![Candle::new(10.0, 10.0, 10.0, 10.0, 0.0); 40];
        let enriched = attach_all(&flat, &IndicatorSettings::default());
        let out = candle_structure_score(&enriched, &EngineProfile::scalp());
        assert!((0.0..=100.0).contains(&out.score));
        assert!(out.score.is_finite());
    }

    #[test]
    fn too_short_window_is_neutral() {
        let out = candle_structure_score(&trend(2, 1.0), &EngineProfile::scalp());
        assert_eq!(out.score, 50.0);
    }
}
