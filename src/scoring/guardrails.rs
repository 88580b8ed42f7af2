// =============================================================================
// Guardrails: Caps, floors and dampeners on the blended score
// =============================================================================

use super::{median, note};
use crate::indicators::ema::ema;
use crate::profile::{Anchor, EngineProfile};
use crate::types::{EnrichedCandle, Flags, Ohlcv};

const RANGE_FLOOR: f64 = 1e-6;

/// Adjustments applied after blending: `clamp(blend * mult, floor, cap)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Guardrail {
    pub mult: f64,
    pub cap: f64,
    pub floor: f64,
    pub reasons: Vec<String>,
}

impl Default for Guardrail {
    fn default() -> Self {
        Self {
            mult: 1.0,
            cap: 100.0,
            floor: 0.0,
            reasons: Vec::new(),
        }
    }
}

fn anchor_value(candle: &EnrichedCandle, anchor: Anchor, use_session_vwap: bool) -> Option<f64> {
    match anchor {
        Anchor::Vwap => candle.anchor_vwap(use_session_vwap),
        Anchor::Ema20 => candle.ema20,
        Anchor::Ema50 => candle.ema50,
        Anchor::Ema200 => candle.ema200,
    }
}

pub fn apply_guardrails(
    candles: &[EnrichedCandle],
    flags: Flags,
    macd_score: f64,
    profile: &EngineProfile,
) -> Guardrail {
    let mut out = Guardrail::default();
    let Some(last) = candles.last() else {
        return out;
    };
    let cfg = &profile.guardrails;

    if flags.overbought && macd_score < 50.0 {
        out.cap = out.cap.min(cfg.overbought_cap);
        out.reasons
            .push("OB dampen (RSI overbought & MACD not confirming)".to_string());
    }
    if flags.oversold && macd_score > 50.0 {
        out.floor = out.floor.max(cfg.oversold_floor);
        out.reasons.push("OS lift (RSI oversold & MACD improving)".to_string());
    }

    // --- Stretch from structural anchors -------------------------------------
    let stretched = cfg.stretch.iter().find(|limit| {
        anchor_value(last, limit.anchor, profile.use_session_vwap)
            .filter(|v| *v != 0.0)
            .is_some_and(|v| ((last.close() - v) / v).abs() > limit.max_pct)
    });
    if let Some(limit) = stretched {
        out.mult *= cfg.stretch_dampen;
        out.reasons
            .push(format!("Stretch dampen (far from {})", limit.anchor));
    }

    // --- Participation --------------------------------------------------------
    let n = candles.len();
    let last_range = last.range().max(RANGE_FLOOR);
    let ranges: Vec<f64> = candles[n.saturating_sub(cfg.range_median_len)..]
        .iter()
        .map(Ohlcv::range)
        .collect();
    let range_median = median(&ranges).max(RANGE_FLOOR);
    let volumes: Vec<f64> = candles.iter().map(Ohlcv::volume).collect();
    let thin_volume = ema(&volumes, profile.candle.volume_ema_len)
        .is_some_and(|base| last.volume() < cfg.min_volume_ratio * base);
    let thin_range = last_range < cfg.min_range_ratio * range_median;
    if thin_range || thin_volume {
        out.mult *= cfg.participation_dampen;
    }
    note(&mut out.reasons, thin_range || thin_volume, "Low participation dampen");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::enrich::{attach_all, IndicatorSettings};
    use crate::types::Candle;

    fn steady(n: usize) -> Vec<EnrichedCandle> {
        let candles: Vec<Candle> = (0..n)
            .map(|i| {
                let c = 100.0 + if i % 2 == 0 { 0.1 } else { -0.1 };
                Candle::new(c, c + 0.5, c - 0.5, c, 1_000.0)
            })
            .collect();
        attach_all(&candles, &IndicatorSettings::default())
    }

    #[test]
    fn quiet_market_has_no_adjustment() {
        let g = apply_guardrails(&steady(40), Flags::default(), 50.0, &EngineProfile::scalp());
        assert_eq!(g, Guardrail::default());
    }

    #[test]
    fn overbought_without_macd_caps() {
        let flags = Flags { overbought: true, oversold: false };
        let g = apply_guardrails(&steady(40), flags, 40.0, &EngineProfile::scalp());
        assert_eq!(g.cap, 70.0);
        let g = apply_guardrails(&steady(40), flags, 60.0, &EngineProfile::scalp());
        assert_eq!(g.cap, 100.0);
    }

    #[test]
    fn oversold_with_macd_lifts() {
        let flags = Flags { overbought: false, oversold: true };
        let g = apply_guardrails(&steady(40), flags, 60.0, &EngineProfile::swing());
        assert_eq!(g.floor, 25.0);
    }

    #[test]
    fn stretch_from_anchor_dampens() {
        let mut candles = steady(40);
        let last = candles.len() - 1;
        candles[last].candle.close = 110.0;
        let g = apply_guardrails(&candles, Flags::default(), 50.0, &EngineProfile::scalp());
        assert!(g.reasons.iter().any(|r| r.starts_with("Stretch dampen")));
        assert!(g.mult < 1.0);
    }

    #[test]
    fn thin_volume_dampens() {
        let mut candles = steady(40);
        let last = candles.len() - 1;
        candles[last].candle.volume = 10.0;
        let g = apply_guardrails(&candles, Flags::default(), 50.0, &EngineProfile::scalp());
        assert!((g.mult - 0.95).abs() < 1e-12);
        assert_eq!(g.reasons, vec!["Low participation dampen".to_string()]);
    }
}
