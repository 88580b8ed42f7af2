// =============================================================================
// Candle Bundles: Loosely-typed JSON rows into validated candles
// =============================================================================
//
// Data suppliers hand over one JSON document per symbol:
//
//   { "symbol": "BTCUSDT",
//     "timeframes": { "5m": [ { "time": 1718000000, "open": .., ... }, ... ] } }
//
// `time` may be unix seconds (integer or float) or an RFC 3339 / "YYYY-MM-DD
// HH:MM:SS" string (read as UTC). Unparseable times are dropped, which makes
// the candle continue the current VWAP session.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::types::{Candle, RawSeries};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTime {
    Secs(i64),
    Float(f64),
    Text(String),
}

impl RawTime {
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Secs(secs) => Utc.timestamp_opt(*secs, 0).single(),
            Self::Float(secs) if secs.is_finite() => {
                let whole = secs.floor();
                let nanos = ((secs - whole) * 1e9).round() as u32;
                Utc.timestamp_opt(whole as i64, nanos.min(999_999_999)).single()
            }
            Self::Float(_) => None,
            Self::Text(text) => {
                let text = text.trim();
                DateTime::parse_from_rfc3339(text)
                    .map(|dt| dt.with_timezone(&Utc))
                    .ok()
                    .or_else(|| {
                        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                            .ok()
                            .map(|naive| naive.and_utc())
                    })
            }
        }
    }
}

/// One candle row as received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCandle {
    #[serde(default)]
    pub time: Option<RawTime>,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub vwap: Option<f64>,
}

impl RawCandle {
    pub fn into_candle(self, timeframe: &str, index: usize) -> Result<Candle, DataError> {
        let require = |value: Option<f64>, field: &'static str| {
            value.ok_or_else(|| DataError::MissingField {
                timeframe: timeframe.to_string(),
                index,
                field,
            })
        };
        Ok(Candle {
            time: self.time.as_ref().and_then(RawTime::to_datetime),
            open: require(self.open, "open")?,
            high: require(self.high, "high")?,
            low: require(self.low, "low")?,
            close: require(self.close, "close")?,
            volume: require(self.volume, "volume")?,
            vwap: self.vwap,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleBundle {
    #[serde(default)]
    pub symbol: String,
    pub timeframes: BTreeMap<String, Vec<RawCandle>>,
}

impl CandleBundle {
    pub fn from_json(text: &str) -> Result<Self, DataError> {
        serde_json::from_str(text).map_err(|e| DataError::InvalidBundle(e.to_string()))
    }

    pub fn into_series(self) -> Result<RawSeries, DataError> {
        self.timeframes
            .into_iter()
            .map(|(tf, rows)| {
                let candles = rows
                    .into_iter()
                    .enumerate()
                    .map(|(i, row)| row.into_candle(&tf, i))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((tf, candles))
            })
            .collect()
    }
}
