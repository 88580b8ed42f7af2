// =============================================================================
// Relative Strength Index (RSI): Wilder's Smoothing
// =============================================================================
//
// Step 1. Compute price changes (deltas) from consecutive closes.
// Step 2. Seed average gain / average loss with the SMA of the first `period`
//          gains / losses.
// Step 3. Apply Wilder's exponential smoothing:
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 4. RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// A zero average loss is an infinite RS, so RSI is exactly 100. That includes
// a perfectly flat market.
// =============================================================================

/// Full RSI series aligned to `closes`.
///
/// The first `period` entries are `None`; the first defined index is `period`.
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - `closes.len() <= period` => all `None` (need `period` deltas)
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    let period_f = period as f64;

    // --- Seed averages with SMA of first `period` deltas ---------------------
    let (sum_gain, sum_loss) = closes[..=period]
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0_f64, 0.0_f64), |(g, l), d| {
            if d >= 0.0 {
                (g + d, l)
            } else {
                (g, l - d)
            }
        });

    let mut avg_gain = sum_gain / period_f;
    let mut avg_loss = sum_loss / period_f;
    out[period] = Some(rsi_from_averages(avg_gain, avg_loss));

    // --- Wilder's smoothing for subsequent values ----------------------------
    for i in period + 1..closes.len() {
        let delta = closes[i] - closes[i - 1];
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);

        avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;
        out[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }

    out
}

/// Most recent RSI value, if defined.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    rsi_series(closes, period).last().copied().flatten()
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty_input() {
        assert!(rsi_series(&[], 14).is_empty());
        assert!(rsi(&[], 14).is_none());
    }

    #[test]
    fn rsi_period_zero() {
        assert!(rsi_series(&[1.0, 2.0, 3.0], 0).iter().all(Option::is_none));
    }

    #[test]
    fn rsi_insufficient_data() {
        // 14 closes => 13 deltas < 14.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert!(rsi_series(&closes, 14).iter().all(Option::is_none));
    }

    #[test]
    fn rsi_all_gains_first_index_is_100() {
        let closes: Vec<f64> = (1..=15).map(|x| x as f64).collect();
        let series = rsi_series(&closes, 14);
        assert!(series[..14].iter().all(Option::is_none));
        assert!((series[14].unwrap() - 100.0).abs() < 1e-10);
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        for v in rsi_series(&closes, 14).into_iter().flatten() {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_flat_market_has_zero_loss() {
        let closes = vec![100.0; 30];
        let series = rsi_series(&closes, 14);
        for v in series.into_iter().flatten() {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        for v in rsi_series(&closes, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_recovers_after_losses() {
        let mut closes: Vec<f64> = (0..20).map(|x| 100.0 - x as f64).collect();
        closes.extend((0..20).map(|x| 81.0 + 2.0 * x as f64));
        let last = rsi(&closes, 14).unwrap();
        assert!(last > 70.0, "RSI should be strong after a rally, got {last}");
    }
}
