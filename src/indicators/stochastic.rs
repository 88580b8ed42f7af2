// =============================================================================
// Stochastic Oscillators: StochRSI and Slow Stochastic
// =============================================================================
//
// StochRSI applies the stochastic formula to RSI instead of price:
//   raw %K = (RSI - min(RSI, n)) / (max(RSI, n) - min(RSI, n)) * 100
//
// Slow stochastic works on price:
//   raw %K = (close - LL(n)) / (HH(n) - LL(n)) * 100
//
// In both cases a zero range over the window defines raw %K as 0. %K is the
// smoothed raw value and %D the smoothed %K.
// =============================================================================

use super::ema::{smooth, MaKind};
use super::rsi::rsi_series;

#[derive(Debug, Clone, PartialEq)]
pub struct StochRsiOutput {
    pub rsi: Vec<Option<f64>>,
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticOutput {
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
}

/// Stochastic RSI with SMA or EMA smoothing, aligned to `closes`.
pub fn stochastic_rsi(
    closes: &[f64],
    rsi_len: usize,
    stoch_len: usize,
    k_smooth: usize,
    d_smooth: usize,
    ma: MaKind,
) -> StochRsiOutput {
    let rsi = rsi_series(closes, rsi_len);
    let mut raw = vec![None; rsi.len()];

    if stoch_len > 0 {
        for i in stoch_len - 1..rsi.len() {
            let window = &rsi[i + 1 - stoch_len..=i];
            if window.iter().any(Option::is_none) {
                continue;
            }
            let (lo, hi) = window
                .iter()
                .flatten()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            raw[i] = rsi[i].map(|current| scaled(current, lo, hi));
        }
    }

    let k = smooth(&raw, k_smooth, ma);
    let d = smooth(&k, d_smooth, ma);
    StochRsiOutput { rsi, k, d }
}

/// Slow stochastic oscillator: raw %K smoothed into %K, then into %D.
///
/// `highs`, `lows` and `closes` must be the same length; extra entries in the
/// longer slices are ignored.
pub fn stochastic_slow(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
    k_smooth: usize,
    d_smooth: usize,
    ma: MaKind,
) -> StochasticOutput {
    let n = closes.len().min(highs.len()).min(lows.len());
    let mut raw = vec![None; n];

    if period > 0 {
        for i in period - 1..n {
            let from = i + 1 - period;
            let hh = highs[from..=i].iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let ll = lows[from..=i].iter().copied().fold(f64::INFINITY, f64::min);
            raw[i] = Some(scaled(closes[i], ll, hh));
        }
    }

    let k = smooth(&raw, k_smooth, ma);
    let d = smooth(&k, d_smooth, ma);
    StochasticOutput { k, d }
}

fn scaled(value: f64, lo: f64, hi: f64) -> f64 {
    let denom = hi - lo;
    if denom == 0.0 {
        0.0
    } else {
        (value - lo) / denom * 100.0
    }
}
