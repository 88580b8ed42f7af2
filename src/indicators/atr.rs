// =============================================================================
// Average True Range (ATR): Wilder's Smoothing Method
// =============================================================================
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is then the smoothed average of TR using Wilder's method:
//   ATR_0   = SMA of first `period` TR values
//   ATR_t   = (ATR_{t-1} * (period - 1) + TR_t) / period
//
// The candle scorer feeds exactly `period + 1` trailing bars, which makes the
// result the plain mean of the last `period` true ranges.
// =============================================================================

use crate::types::Ohlcv;

/// Most recent ATR over `candles` (oldest first).
///
/// # Returns
/// `None` when:
/// - `period` is zero.
/// - There are fewer than `period + 1` candles.
/// - Any intermediate value is non-finite.
pub fn calculate_atr<C: Ohlcv>(candles: &[C], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period + 1 {
        return None;
    }

    // --- Step 1: True Range for each consecutive pair ------------------------
    let tr_values: Vec<f64> = candles
        .windows(2)
        .map(|w| {
            let (prev_close, high, low) = (w[0].close(), w[1].high(), w[1].low());
            (high - low)
                .max((high - prev_close).abs())
                .max((low - prev_close).abs())
        })
        .collect();

    // --- Step 2: Seed with SMA of first `period` TR values -------------------
    let seed = tr_values[..period].iter().sum::<f64>() / period as f64;
    if !seed.is_finite() {
        return None;
    }

    // --- Step 3: Wilder's smoothing for remaining TR values ------------------
    let period_f = period as f64;
    let mut atr = seed;
    for &tr in &tr_values[period..] {
        atr = (atr * (period_f - 1.0) + tr) / period_f;
    }

    atr.is_finite().then_some(atr)
}

/// ATR over the trailing `period + 1` bars only.
pub fn trailing_atr<C: Ohlcv>(candles: &[C], period: usize) -> Option<f64> {
    let start = candles.len().saturating_sub(period + 1);
    calculate_atr(&candles[start..], period)
}
