// =============================================================================
// Standard Indicator Attachment
// =============================================================================
//
// Derives the full indicator set for a candle window in one pass and returns
// new `EnrichedCandle`s; the input OHLCV rows are never modified.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::bollinger::bollinger_bands;
use super::candle_type::candle_type;
use super::ema::{ema_series, MaKind};
use super::macd::macd;
use super::stochastic::{stochastic_rsi, stochastic_slow};
use super::vwap::{session_vwap, PriceMode};
use crate::types::{Candle, EnrichedCandle};

/// Periods and options for [`attach_all`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSettings {
    pub rsi_len: usize,
    pub stoch_rsi_len: usize,
    pub stoch_k_smooth: usize,
    pub stoch_d_smooth: usize,
    pub stoch_ma: MaKind,
    pub stoch_slow_len: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bb_len: usize,
    pub bb_mult: f64,
    pub bb_sample: bool,
    pub vwap_price: PriceMode,
    pub session_tz: Tz,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            rsi_len: 14,
            stoch_rsi_len: 14,
            stoch_k_smooth: 3,
            stoch_d_smooth: 3,
            stoch_ma: MaKind::Sma,
            stoch_slow_len: 14,
            macd_fast: 8,
            macd_slow: 21,
            macd_signal: 5,
            bb_len: 20,
            bb_mult: 2.0,
            bb_sample: false,
            vwap_price: PriceMode::Typical,
            session_tz: chrono_tz::America::New_York,
        }
    }
}

impl IndicatorSettings {
    pub fn with_session_tz(mut self, session_tz: Tz) -> Self {
        self.session_tz = session_tz;
        self
    }
}

/// Attach every standard indicator to `candles` (oldest first).
pub fn attach_all(candles: &[Candle], settings: &IndicatorSettings) -> Vec<EnrichedCandle> {
    if candles.is_empty() {
        return Vec::new();
    }

    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

    let stoch_rsi = stochastic_rsi(
        &closes,
        settings.rsi_len,
        settings.stoch_rsi_len,
        settings.stoch_k_smooth,
        settings.stoch_d_smooth,
        settings.stoch_ma,
    );
    let ema9 = ema_series(&closes, 9);
    let ema20 = ema_series(&closes, 20);
    let ema50 = ema_series(&closes, 50);
    let ema200 = ema_series(&closes, 200);
    let slow = stochastic_slow(
        &highs,
        &lows,
        &closes,
        settings.stoch_slow_len,
        settings.stoch_k_smooth,
        settings.stoch_d_smooth,
        settings.stoch_ma,
    );
    let macd = macd(&closes, settings.macd_fast, settings.macd_slow, settings.macd_signal);
    let bb = bollinger_bands(&closes, settings.bb_len, settings.bb_mult, settings.bb_sample, true);
    let pct_b = bb.pct_b.unwrap_or_default();
    let bandwidth = bb.bandwidth.unwrap_or_default();
    let vwap = session_vwap(candles, settings.vwap_price, settings.session_tz);

    candles
        .iter()
        .enumerate()
        .map(|(i, c)| EnrichedCandle {
            candle: c.clone(),
            rsi: stoch_rsi.rsi[i],
            stoch_rsi_k: stoch_rsi.k[i],
            stoch_rsi_d: stoch_rsi.d[i],
            ema9: ema9[i],
            ema20: ema20[i],
            ema50: ema50[i],
            ema200: ema200[i],
            stoch_slow_k: slow.k[i],
            stoch_slow_d: slow.d[i],
            macd_line: macd.line[i],
            macd_signal: macd.signal[i],
            macd_hist: macd.hist[i],
            bb_mid: bb.mid[i],
            bb_upper: bb.upper[i],
            bb_lower: bb.lower[i],
            bb_pct_b: pct_b.get(i).copied().flatten(),
            bb_bandwidth: bandwidth.get(i).copied().flatten(),
            session_vwap: vwap[i],
            candle_type: candle_type(c.open, c.high, c.low, c.close),
        })
        .collect()
}

/// Recompute the session VWAP of an already-enriched window in place.
pub fn refresh_session_vwap(candles: &mut [EnrichedCandle], price_mode: PriceMode, session_tz: Tz) {
    let raw: Vec<Candle> = candles.iter().map(|c| c.candle.clone()).collect();
    for (candle, vwap) in candles.iter_mut().zip(session_vwap(&raw, price_mode, session_tz)) {
        candle.session_vwap = vwap;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CandleType;

    fn rising(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let base = 100.0 + i as f64;
                Candle::new(base, base + 1.5, base - 0.5, base + 1.0, 10.0)
            })
            .collect()
    }

    #[test]
    fn attach_all_aligns_and_preserves_ohlcv() {
        let candles = rising(60);
        let enriched = attach_all(&candles, &IndicatorSettings::default());
        assert_eq!(enriched.len(), 60);
        for (raw, e) in candles.iter().zip(&enriched) {
            assert_eq!(raw, &e.candle);
        }
    }

    #[test]
    fn attach_all_warm_up_is_none() {
        let enriched = attach_all(&rising(60), &IndicatorSettings::default());
        assert!(enriched[7].ema9.is_none());
        assert!(enriched[8].ema9.is_some());
        assert!(enriched[18].ema20.is_none());
        assert!(enriched[19].ema20.is_some());
        assert!(enriched[59].ema50.is_some());
        assert!(enriched[59].ema200.is_none());
        assert!(enriched[13].rsi.is_none());
        assert!(enriched[14].rsi.is_some());
        assert!(enriched[20].macd_hist.is_some());
        assert!(enriched[59].bb_pct_b.is_some());
    }

    #[test]
    fn attach_all_classifies_candles() {
        let enriched = attach_all(&rising(3), &IndicatorSettings::default());
        // body 1.0 of range 2.0, wicks 0.5 each.
        assert_eq!(enriched[0].candle_type, CandleType::Bullish);
    }

    #[test]
    fn attach_all_empty() {
        assert!(attach_all(&[], &IndicatorSettings::default()).is_empty());
    }
}
