// =============================================================================
// Shared types used across the strength engine
// =============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::indicators::candle_type::candle_type as classify;

/// Raw OHLCV history per timeframe label, oldest first.
pub type RawSeries = BTreeMap<String, Vec<Candle>>;

/// Enriched history per timeframe label, oldest first.
pub type TimeframeSeries = BTreeMap<String, Vec<EnrichedCandle>>;

// =============================================================================
// Candles
// =============================================================================

/// A single OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar timestamp. Only needed for session-VWAP day boundaries.
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Exchange-supplied VWAP, if the data source provides one.
    #[serde(default)]
    pub vwap: Option<f64>,
}

impl Candle {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time: None,
            open,
            high,
            low,
            close,
            volume,
            vwap: None,
        }
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }
}

/// Read access to the OHLCV part of a bar, shared by raw and enriched candles.
pub trait Ohlcv {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;

    /// High minus low, never negative.
    fn range(&self) -> f64 {
        (self.high() - self.low()).max(0.0)
    }
}

impl Ohlcv for Candle {
    fn open(&self) -> f64 {
        self.open
    }
    fn high(&self) -> f64 {
        self.high
    }
    fn low(&self) -> f64 {
        self.low
    }
    fn close(&self) -> f64 {
        self.close
    }
    fn volume(&self) -> f64 {
        self.volume
    }
}

/// Shape classification of a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandleType {
    #[serde(rename = "doji")]
    Doji,
    #[serde(rename = "bullish marubozu")]
    BullishMarubozu,
    #[serde(rename = "bearish marubozu")]
    BearishMarubozu,
    #[serde(rename = "hammer")]
    Hammer,
    #[serde(rename = "hanging man")]
    HangingMan,
    #[serde(rename = "inverted hammer")]
    InvertedHammer,
    #[serde(rename = "shooting star")]
    ShootingStar,
    #[serde(rename = "spinning top")]
    SpinningTop,
    #[serde(rename = "bullish")]
    Bullish,
    #[serde(rename = "bearish")]
    Bearish,
}

impl CandleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Doji => "doji",
            Self::BullishMarubozu => "bullish marubozu",
            Self::BearishMarubozu => "bearish marubozu",
            Self::Hammer => "hammer",
            Self::HangingMan => "hanging man",
            Self::InvertedHammer => "inverted hammer",
            Self::ShootingStar => "shooting star",
            Self::SpinningTop => "spinning top",
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
        }
    }
}

impl std::fmt::Display for CandleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candle plus every derived indicator value.
///
/// Indicator fields stay `None` until their warm-up is satisfied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCandle {
    #[serde(flatten)]
    pub candle: Candle,
    pub rsi: Option<f64>,
    pub stoch_rsi_k: Option<f64>,
    pub stoch_rsi_d: Option<f64>,
    pub ema9: Option<f64>,
    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
    pub ema200: Option<f64>,
    pub stoch_slow_k: Option<f64>,
    pub stoch_slow_d: Option<f64>,
    pub macd_line: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub bb_mid: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_pct_b: Option<f64>,
    pub bb_bandwidth: Option<f64>,
    pub session_vwap: Option<f64>,
    pub candle_type: CandleType,
}

impl EnrichedCandle {
    /// `candle` with its shape classified and no indicator values yet.
    pub fn bare(candle: Candle) -> Self {
        let candle_type = classify(candle.open, candle.high, candle.low, candle.close);
        Self {
            candle,
            rsi: None,
            stoch_rsi_k: None,
            stoch_rsi_d: None,
            ema9: None,
            ema20: None,
            ema50: None,
            ema200: None,
            stoch_slow_k: None,
            stoch_slow_d: None,
            macd_line: None,
            macd_signal: None,
            macd_hist: None,
            bb_mid: None,
            bb_upper: None,
            bb_lower: None,
            bb_pct_b: None,
            bb_bandwidth: None,
            session_vwap: None,
            candle_type,
        }
    }

    /// Every derived indicator value, keyed by field name.
    pub fn indicator_values(&self) -> [(&'static str, Option<f64>); 18] {
        [
            ("rsi", self.rsi),
            ("stoch_rsi_k", self.stoch_rsi_k),
            ("stoch_rsi_d", self.stoch_rsi_d),
            ("ema9", self.ema9),
            ("ema20", self.ema20),
            ("ema50", self.ema50),
            ("ema200", self.ema200),
            ("stoch_slow_k", self.stoch_slow_k),
            ("stoch_slow_d", self.stoch_slow_d),
            ("macd_line", self.macd_line),
            ("macd_signal", self.macd_signal),
            ("macd_hist", self.macd_hist),
            ("bb_mid", self.bb_mid),
            ("bb_upper", self.bb_upper),
            ("bb_lower", self.bb_lower),
            ("bb_pct_b", self.bb_pct_b),
            ("bb_bandwidth", self.bb_bandwidth),
            ("session_vwap", self.session_vwap),
        ]
    }

    /// VWAP the scorer anchors on.
    ///
    /// With `use_session_vwap` the session VWAP wins and the exchange VWAP is
    /// the fallback; otherwise only the exchange VWAP is used.
    pub fn anchor_vwap(&self, use_session_vwap: bool) -> Option<f64> {
        if use_session_vwap {
            self.session_vwap.or(self.candle.vwap)
        } else {
            self.candle.vwap
        }
    }
}

impl Ohlcv for EnrichedCandle {
    fn open(&self) -> f64 {
        self.candle.open
    }
    fn high(&self) -> f64 {
        self.candle.high
    }
    fn low(&self) -> f64 {
        self.candle.low
    }
    fn close(&self) -> f64 {
        self.candle.close
    }
    fn volume(&self) -> f64 {
        self.candle.volume
    }
}

// =============================================================================
// Results
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    pub overbought: bool,
    pub oversold: bool,
}

/// The three sub-scores behind a timeframe score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub candle_engine: f64,
    pub rsi_trio: f64,
    pub macd: f64,
}

impl Default for Breakdown {
    fn default() -> Self {
        Self {
            candle_engine: 50.0,
            rsi_trio: 50.0,
            macd: 50.0,
        }
    }
}

/// A single scoring pass over one candle window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeScore {
    pub score: f64,
    pub breakdown: Breakdown,
    pub reasons: Vec<String>,
    pub flags: Flags,
}

/// Per-timeframe output with short-term dynamics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeResult {
    pub score: f64,
    pub velocity: f64,
    pub accel: f64,
    pub reasons: Vec<String>,
    pub flags: Flags,
    pub breakdown: Breakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallResult {
    pub score: f64,
    pub velocity: f64,
    pub accel: f64,
    pub confidence: f64,
    pub synergy: String,
}

/// Everything a single `score_all` call produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBundle {
    pub per_timeframe: BTreeMap<String, TimeframeResult>,
    pub overall: OverallResult,
}
