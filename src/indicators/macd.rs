// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   line   = EMA(close, fast) - EMA(close, slow)
//   signal = EMA(line, signal_len)
//   hist   = line - signal
//
// The signal EMA runs over the line with its warm-up entries read as 0.0, so
// the signal is defined from index `signal_len - 1` onwards. The histogram is
// only defined where the line is.
// =============================================================================

use super::ema::ema_series;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdOutput {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub hist: Vec<Option<f64>>,
}

pub fn macd(closes: &[f64], fast_len: usize, slow_len: usize, signal_len: usize) -> MacdOutput {
    let fast = ema_series(closes, fast_len);
    let slow = ema_series(closes, slow_len);

    let line: Vec<Option<f64>> = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let seeded: Vec<f64> = line.iter().map(|v| v.unwrap_or(0.0)).collect();
    let signal = ema_series(&seeded, signal_len);

    let hist = line
        .iter()
        .zip(&signal)
        .map(|(l, s)| Some((*l)? - (*s)?))
        .collect();

    MacdOutput { line, signal, hist }
}
