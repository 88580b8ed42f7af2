// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free transforms over oldest-to-newest sequences. Series
// functions return a vector aligned with the input whose leading entries are
// `None` until the indicator has warmed up; trailing-value functions return
// `Option<f64>`. Degenerate denominators follow the per-indicator rules in
// each file and never produce NaN.

pub mod atr;
pub mod bollinger;
pub mod candle_type;
pub mod ema;
pub mod enrich;
pub mod macd;
pub mod rsi;
pub mod stochastic;
pub mod vwap;

pub use bollinger::{bollinger_bands, rolling_stddev, BollingerBands};
pub use candle_type::candle_type;
pub use ema::{ema, ema_series, sma, sma_series, MaKind};
pub use enrich::{attach_all, IndicatorSettings};
pub use macd::{macd, MacdOutput};
pub use rsi::{rsi, rsi_series};
pub use stochastic::{stochastic_rsi, stochastic_slow, StochRsiOutput, StochasticOutput};
pub use vwap::{session_vwap, PriceMode};
