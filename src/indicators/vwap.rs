// =============================================================================
// Session VWAP
// =============================================================================
//
// Cumulative volume-weighted price that resets whenever the calendar day of a
// candle (in the session timezone) differs from the previous dated candle.
//
// - Candles without a timestamp continue the current session.
// - Zero or negative volume adds nothing to the accumulator and does not reset
//   it; the previous VWAP is carried.
// - `None` until the session has seen positive volume.

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::types::Candle;

/// Price basis fed into the VWAP accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceMode {
    /// (H + L + C) / 3
    #[default]
    Typical,
    /// (O + H + L + C) / 4
    Ohlc4,
    Close,
}

impl PriceMode {
    pub fn price(&self, candle: &Candle) -> f64 {
        match self {
            Self::Typical => (candle.high + candle.low + candle.close) / 3.0,
            Self::Ohlc4 => (candle.open + candle.high + candle.low + candle.close) / 4.0,
            Self::Close => candle.close,
        }
    }
}

pub fn session_vwap(candles: &[Candle], price_mode: PriceMode, session_tz: Tz) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(candles.len());
    let mut cum_pv = 0.0;
    let mut cum_v = 0.0;
    let mut prev_day: Option<NaiveDate> = None;

    for candle in candles {
        let day = candle
            .time
            .map(|t| t.with_timezone(&session_tz).date_naive());

        if let (Some(day), Some(prev)) = (day, prev_day) {
            if day != prev {
                cum_pv = 0.0;
                cum_v = 0.0;
            }
        }
        prev_day = day.or(prev_day);

        if candle.volume > 0.0 {
            cum_pv += price_mode.price(candle) * candle.volume;
            cum_v += candle.volume;
        }
        out.push((cum_v > 0.0).then(|| cum_pv / cum_v));
    }

    out
}
