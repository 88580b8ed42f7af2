// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ). Extras:
//   %B        = (close - lower) / (upper - lower)
//   bandwidth = (upper - lower) / middle
// both `None` when their denominator is zero.

use super::ema::sma_series;

/// Aligned Bollinger series. `pct_b` / `bandwidth` are only present when
/// requested.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub mid: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
    pub pct_b: Option<Vec<Option<f64>>>,
    pub bandwidth: Option<Vec<Option<f64>>>,
}

/// Sliding-window standard deviation, population (`sample == false`) or
/// sample (N-1).
pub fn rolling_stddev(values: &[f64], period: usize, sample: bool) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    for (offset, window) in values.windows(period).enumerate() {
        out[offset + period - 1] = Some(stddev(window, sample));
    }
    out
}

/// Standard deviation of a whole slice; 0.0 for an empty slice.
pub fn stddev(values: &[f64], sample: bool) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var_sum: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    let denom = if sample { (n - 1).max(1) } else { n };
    (var_sum / denom as f64).sqrt()
}

pub fn bollinger_bands(
    closes: &[f64],
    period: usize,
    mult: f64,
    sample: bool,
    with_extras: bool,
) -> BollingerBands {
    let n = closes.len();
    let mid = sma_series(closes, period);
    let sd = rolling_stddev(closes, period, sample);

    let mut upper = vec![None; n];
    let mut lower = vec![None; n];
    let mut pct_b = vec![None; n];
    let mut bandwidth = vec![None; n];

    for i in 0..n {
        let (Some(m), Some(s)) = (mid[i], sd[i]) else {
            continue;
        };
        let up = m + mult * s;
        let lo = m - mult * s;
        upper[i] = Some(up);
        lower[i] = Some(lo);

        if with_extras {
            let width = up - lo;
            pct_b[i] = (width != 0.0).then(|| (closes[i] - lo) / width);
            bandwidth[i] = (m != 0.0).then(|| width / m);
        }
    }

    BollingerBands {
        mid,
        upper,
        lower,
        pct_b: with_extras.then_some(pct_b),
        bandwidth: with_extras.then_some(bandwidth),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bollinger_basic() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let bb = bollinger_bands(&closes, 20, 2.0, false, true);
        let (up, mid, lo) = (bb.upper[19].unwrap(), bb.mid[19].unwrap(), bb.lower[19].unwrap());
        assert!(up > mid && lo < mid);
        assert!(bb.bandwidth.unwrap()[19].unwrap() > 0.0);
        assert!(bb.upper[18].is_none());
    }

    #[test]
    fn bollinger_flat_has_no_pct_b() {
        let bb = bollinger_bands(&[100.0; 20], 20, 2.0, false, true);
        assert!(bb.pct_b.unwrap()[19].is_none());
        assert!((bb.bandwidth.unwrap()[19].unwrap()).abs() < 1e-12);
    }

    #[test]
    fn bollinger_without_extras() {
        let bb = bollinger_bands(&[1.0, 2.0, 3.0], 2, 2.0, false, false);
        assert!(bb.pct_b.is_none() && bb.bandwidth.is_none());
    }

    #[test]
    fn stddev_population_vs_sample() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((stddev(&values, false) - 2.0).abs() < 1e-12);
        assert!(stddev(&values, true) > 2.0);
        let rolling = rolling_stddev(&values, 8, false);
        assert!((rolling[7].unwrap() - 2.0).abs() < 1e-12);
    }
}
