// =============================================================================
// MACD Score: Histogram sign, momentum and cross proximity
// =============================================================================
//
//   sgn   sign of hist[t]
//   exp   tanh((hist[t] - hist[t-L]) / (0.9 * sigma))
//   prox  1 - min(1, |line - signal| / (0.9 * sigma)), signed by exp
//
// sigma is the population stddev of the last SIGMA_WINDOW defined histogram
// values up to t; a zero sigma falls back to SIGMA_FALLBACK.

use super::{note, sign, to_score, SubScore};
use crate::indicators::bollinger::stddev;
use crate::profile::EngineProfile;
use crate::types::EnrichedCandle;

const SIGMA_WINDOW: usize = 50;
const SIGMA_FALLBACK: f64 = 0.5;
const PROX_FLOOR: f64 = 1e-6;

pub fn macd_score(candles: &[EnrichedCandle], profile: &EngineProfile) -> SubScore {
    let Some(t) = candles.len().checked_sub(1) else {
        return SubScore::neutral("macd_neutral");
    };
    let t3 = t.saturating_sub(profile.lookback);

    let (Some(h_now), Some(h_then)) = (candles[t].macd_hist, candles[t3].macd_hist) else {
        return SubScore::neutral("macd_neutral");
    };

    let window: Vec<f64> = candles[(t + 1).saturating_sub(SIGMA_WINDOW)..=t]
        .iter()
        .filter_map(|c| c.macd_hist)
        .collect();
    let sigma = match stddev(&window, false) {
        s if s > 0.0 => s,
        _ => SIGMA_FALLBACK,
    };

    let sgn = sign(h_now);
    let exp = ((h_now - h_then) / (0.9 * sigma)).tanh();

    let line = candles[t].macd_line.unwrap_or(0.0);
    let signal = candles[t].macd_signal.unwrap_or(0.0);
    let prox = 1.0 - ((line - signal).abs() / (0.9 * sigma).max(PROX_FLOOR)).min(1.0);

    let direction = if exp >= 0.0 { 1.0 } else { -1.0 };
    let raw = 0.50 * exp + 0.30 * sgn + 0.20 * prox * direction;

    let mut reasons = Vec::new();
    note(&mut reasons, sgn > 0.0, "MACD histogram > 0");
    note(&mut reasons, sgn < 0.0, "MACD histogram < 0");
    note(&mut reasons, exp > 0.3, "MACD momentum expanding");
    note(&mut reasons, exp < -0.3, "MACD momentum contracting");
    note(&mut reasons, prox > 0.6 && exp > 0.0, "Bull cross proximity");
    note(&mut reasons, prox > 0.6 && exp < 0.0, "Bear cross proximity");

    SubScore {
        score: to_score(raw),
        reasons,
    }
}
