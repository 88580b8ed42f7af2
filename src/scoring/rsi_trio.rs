// =============================================================================
// RSI Trio: Fast / regular / slow RSI levels and slopes
// =============================================================================
//
// RSI(7), RSI(14) and RSI(21) are recomputed from closes. Each period gives a
// level term tanh((rsi - 50) / 12) and a slope term tanh((rsi[t] - rsi[t-L]) / 6),
// where L is the profile lookback. Missing values read as 50.

use super::{note, sign, to_score, SubScore};
use crate::indicators::rsi::rsi_series;
use crate::profile::EngineProfile;
use crate::types::{EnrichedCandle, Flags, Ohlcv};

pub const RSI_FAST: usize = 7;
pub const RSI_REGULAR: usize = 14;
pub const RSI_SLOW: usize = 21;

const ALIGN_BONUS: f64 = 0.06;
const GROWTH_BONUS: f64 = 0.06;

#[derive(Debug, Clone, PartialEq)]
pub struct RsiTrioScore {
    pub sub: SubScore,
    pub flags: Flags,
}

fn level(x: f64) -> f64 {
    ((x - 50.0) / 12.0).tanh()
}

fn slope(now: f64, then: f64) -> f64 {
    ((now - then) / 6.0).tanh()
}

fn norm(points: f64) -> f64 {
    (points / 90.0).tanh()
}

/// (value at t, value at t3), both defaulting to 50.
fn endpoints(series: &[Option<f64>], t: usize, t3: usize) -> (f64, f64) {
    let at = |i: usize| series.get(i).copied().flatten().unwrap_or(50.0);
    (at(t), at(t3))
}

pub fn rsi_trio_score(candles: &[EnrichedCandle], profile: &EngineProfile) -> RsiTrioScore {
    let closes: Vec<f64> = candles.iter().map(Ohlcv::close).collect();
    let t = closes.len().saturating_sub(1);
    let t3 = t.saturating_sub(profile.lookback);

    let (f_now, f_then) = endpoints(&rsi_series(&closes, RSI_FAST), t, t3);
    let (r_now, r_then) = endpoints(&rsi_series(&closes, RSI_REGULAR), t, t3);
    let (s_now, s_then) = endpoints(&rsi_series(&closes, RSI_SLOW), t, t3);

    let (f_lvl, f_slp) = (level(f_now), slope(f_now, f_then));
    let (r_lvl, r_slp) = (level(r_now), slope(r_now, r_then));
    let (s_lvl, s_slp) = (level(s_now), slope(s_now, s_then));

    let fast = norm(60.0 * f_slp + 20.0 * f_lvl);
    let regular = norm(40.0 * r_lvl + 30.0 * r_slp);
    let slow = norm(45.0 * s_slp + 15.0 * s_lvl);

    // +1 same direction, 0 if either is flat, -1 opposed.
    let agree = sign(f_slp) * sign(s_slp);

    let mut growth = 0.0;
    if f_slp > 0.25 && r_slp > 0.15 {
        growth += GROWTH_BONUS;
    }
    if f_slp < -0.25 && r_slp < -0.15 {
        growth -= GROWTH_BONUS;
    }

    let raw = 0.45 * regular + 0.35 * fast + 0.20 * slow + ALIGN_BONUS * agree + growth;

    let flags = Flags {
        overbought: r_now >= profile.rsi.overbought,
        oversold: r_now <= profile.rsi.oversold,
    };

    let mut reasons = Vec::new();
    note(&mut reasons, r_lvl > 0.3, "RSI(14) above 60");
    note(&mut reasons, r_lvl < -0.3, "RSI(14) below 40");
    note(&mut reasons, f_slp > 0.4, "RSI fast rising");
    note(&mut reasons, f_slp < -0.4, "RSI fast falling");
    note(&mut reasons, agree > 0.0, "Fast RSI trend validated by slow");
    note(&mut reasons, agree < 0.0, "Fast RSI disagrees with slow");
    if profile.rsi.annotate_extremes {
        note(&mut reasons, flags.overbought, "Overbought");
        note(&mut reasons, flags.oversold, "Oversold");
    }

    RsiTrioScore {
        sub: SubScore {
            score: to_score(raw),
            reasons,
        },
        flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::enrich::{attach_all, IndicatorSettings};
    use crate::types::Candle;

    fn from_closes(closes: &[f64]) -> Vec<EnrichedCandle> {
        let candles: Vec<Candle> = closes
            .iter()
            .map(|&c| Candle::new(c, c + 0.5, c - 0.5, c, 100.0))
            .collect();
        attach_all(&candles, &IndicatorSettings::default())
    }

    #[test]
    fn rising_closes_flag_overbought() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let out = rsi_trio_score(&from_closes(&closes), &EngineProfile::scalp());
        assert!(out.flags.overbought);
        assert!(!out.flags.oversold);
        assert!(out.sub.score > 50.0);
        assert!(out.sub.reasons.iter().any(|r| r == "RSI(14) above 60"));
    }

    #[test]
    fn falling_closes_flag_oversold() {
        let closes: Vec<f64> = (0..40).map(|i| 200.0 - i as f64).collect();
        let out = rsi_trio_score(&from_closes(&closes), &EngineProfile::scalp());
        assert!(out.flags.oversold);
        assert!(out.sub.score < 50.0);
        assert!(out.sub.reasons.iter().any(|r| r == "RSI(14) below 40"));
    }

    #[test]
    fn swing_annotates_extremes() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let candles = from_closes(&closes);
        let swing = rsi_trio_score(&candles, &EngineProfile::swing());
        let scalp = rsi_trio_score(&candles, &EngineProfile::scalp());
        assert!(swing.sub.reasons.iter().any(|r| r == "Overbought"));
        assert!(!scalp.sub.reasons.iter().any(|r| r == "Overbought"));
    }

    #[test]
    fn short_history_reads_neutral_rsi() {
        let out = rsi_trio_score(&from_closes(&[10.0, 10.5, 10.2]), &EngineProfile::scalp());
        assert!((out.sub.score - 50.0).abs() < 1e-10);
        assert_eq!(out.flags, Flags::default());
        assert!(out.sub.reasons.is_empty());
    }
}
