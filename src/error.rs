// =============================================================================
// Error types
// =============================================================================
//
// Only malformed input is a hard failure. Short history and degenerate numbers
// are resolved inside the engine and never surface here.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// The caller supplied no timeframes at all.
    #[error("no timeframes supplied")]
    EmptySeries,

    /// A candle row lacks one of open/high/low/close/volume.
    #[error("timeframe {timeframe}: candle #{index} is missing `{field}`")]
    MissingField {
        timeframe: String,
        index: usize,
        field: &'static str,
    },

    /// A candle carries NaN or an infinite value.
    #[error("timeframe {timeframe}: candle #{index} has non-finite `{field}` ({value})")]
    NonFinite {
        timeframe: String,
        index: usize,
        field: &'static str,
        value: f64,
    },

    /// The bundle document could not be decoded at all.
    #[error("invalid candle bundle: {0}")]
    InvalidBundle(String),
}
