// =============================================================================
// Moving Averages: SMA and EMA
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   alpha = 2 / (period + 1)
//   EMA_t = (value_t - EMA_{t-1}) * alpha + EMA_{t-1}
//
// The very first EMA value is seeded with the SMA of the first `period` values.
//
// Series functions return a vector aligned with the input: entry `i` belongs to
// `values[i]`, leading entries are `None` until the warm-up is satisfied.
// =============================================================================

use serde::{Deserialize, Serialize};

/// Moving-average kind used by the stochastic smoothers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MaKind {
    #[default]
    Sma,
    Ema,
}

impl MaKind {
    pub fn series(&self, values: &[f64], period: usize) -> Vec<Option<f64>> {
        match self {
            Self::Sma => sma_series(values, period),
            Self::Ema => ema_series(values, period),
        }
    }
}

/// SMA of the last `period` values.
///
/// `None` when `period == 0` or there are fewer than `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Full SMA series aligned to `values`; first defined index is `period - 1`.
pub fn sma_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    for (offset, window) in values.windows(period).enumerate() {
        out[offset + period - 1] = Some(window.iter().sum::<f64>() / period as f64);
    }
    out
}

/// EMA over the whole of `values`, returning only the final value.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).last().copied().flatten()
}

/// Full EMA series aligned to `values`; first defined index is `period - 1`.
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - `values.len() < period` => all `None`
pub fn ema_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let alpha = 2.0 / (period as f64 + 1.0);

    // Seed: SMA of the first `period` values.
    let mut ema = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(ema);

    for (i, &value) in values.iter().enumerate().skip(period) {
        ema += (value - ema) * alpha;
        out[i] = Some(ema);
    }
    out
}

/// Smooth a partially-defined series.
///
/// The average restarts on every contiguous run of defined values, so an
/// output entry is only defined once `period` consecutive inputs are defined.
pub fn smooth(series: &[Option<f64>], period: usize, kind: MaKind) -> Vec<Option<f64>> {
    let mut out = vec![None; series.len()];
    let mut start = 0;
    while start < series.len() {
        if series[start].is_none() {
            start += 1;
            continue;
        }
        let end = series[start..]
            .iter()
            .position(Option::is_none)
            .map_or(series.len(), |p| start + p);
        let run: Vec<f64> = series[start..end].iter().flatten().copied().collect();
        for (offset, value) in kind.series(&run, period).into_iter().enumerate() {
            out[start + offset] = value;
        }
        start = end;
    }
    out
}
