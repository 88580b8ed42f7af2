// =============================================================================
// Strength Engine: Public entry points
// =============================================================================
//
// `score_all` scores an already-enriched series; `score_candles` enriches raw
// OHLCV first. Both validate their input, score every timeframe with dynamics
// and aggregate the results. Neither touches shared state, so independent
// calls may run concurrently.
// =============================================================================

use std::collections::BTreeMap;

use tracing::debug;

use crate::aggregate::aggregate;
use crate::error::DataError;
use crate::indicators::enrich::{attach_all, refresh_session_vwap, IndicatorSettings};
use crate::indicators::vwap::PriceMode;
use crate::profile::EngineProfile;
use crate::scoring::evaluate_timeframe;
use crate::types::{Candle, EnrichedCandle, RawSeries, ScoreBundle, TimeframeSeries};

fn check_finite(timeframe: &str, index: usize, field: &'static str, value: f64) -> Result<(), DataError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DataError::NonFinite {
            timeframe: timeframe.to_string(),
            index,
            field,
            value,
        })
    }
}

fn validate_candle(timeframe: &str, index: usize, candle: &Candle) -> Result<(), DataError> {
    check_finite(timeframe, index, "open", candle.open)?;
    check_finite(timeframe, index, "high", candle.high)?;
    check_finite(timeframe, index, "low", candle.low)?;
    check_finite(timeframe, index, "close", candle.close)?;
    check_finite(timeframe, index, "volume", candle.volume)?;
    if let Some(vwap) = candle.vwap {
        check_finite(timeframe, index, "vwap", vwap)?;
    }
    Ok(())
}

fn validate_enriched(timeframe: &str, index: usize, candle: &EnrichedCandle) -> Result<(), DataError> {
    validate_candle(timeframe, index, &candle.candle)?;
    for (field, value) in candle.indicator_values() {
        if let Some(value) = value {
            check_finite(timeframe, index, field, value)?;
        }
    }
    Ok(())
}

fn validate<'a, T, F>(series: &'a BTreeMap<String, Vec<T>>, check: F) -> Result<(), DataError>
where
    F: Fn(&str, usize, &'a T) -> Result<(), DataError>,
{
    if series.is_empty() {
        return Err(DataError::EmptySeries);
    }
    for (tf, candles) in series {
        for (i, candle) in candles.iter().enumerate() {
            check(tf.as_str(), i, candle)?;
        }
    }
    Ok(())
}

/// Score every timeframe of an enriched series and aggregate.
pub fn score_all(series: &TimeframeSeries, profile: &EngineProfile) -> Result<ScoreBundle, DataError> {
    validate(series, validate_enriched)?;

    let mut per_timeframe = BTreeMap::new();
    for (tf, candles) in series {
        let result = if profile.use_session_vwap {
            let mut window: Vec<EnrichedCandle> = candles.clone();
            refresh_session_vwap(&mut window, PriceMode::Typical, profile.session_tz);
            evaluate_timeframe(&window, profile)
        } else {
            evaluate_timeframe(candles, profile)
        };

        debug!(
            timeframe = %tf,
            bars = candles.len(),
            score = result.score,
            velocity = result.velocity,
            accel = result.accel,
            "timeframe evaluated"
        );
        per_timeframe.insert(tf.clone(), result);
    }

    let overall = aggregate(&per_timeframe, profile);
    Ok(ScoreBundle {
        per_timeframe,
        overall,
    })
}

/// Enrich raw OHLCV with the standard indicator set, then [`score_all`].
pub fn score_candles(raw: &RawSeries, profile: &EngineProfile) -> Result<ScoreBundle, DataError> {
    validate(raw, validate_candle)?;

    let settings = IndicatorSettings::default().with_session_tz(profile.session_tz);
    let series: TimeframeSeries = raw
        .iter()
        .map(|(tf, candles)| (tf.clone(), attach_all(candles, &settings)))
        .collect();

    score_all(&series, profile)
}
