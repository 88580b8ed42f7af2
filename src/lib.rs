// =============================================================================
// tf-strength: Multi-timeframe technical strength scoring
// =============================================================================
//
// Pure scoring core: indicator library, per-timeframe scorer with dynamics,
// cross-timeframe aggregation and the scalp / swing engine profiles. Input
// decoding and settings persistence sit alongside for callers.
// =============================================================================

pub mod aggregate;
pub mod bundle;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod profile;
pub mod runtime_config;
pub mod scoring;
pub mod types;

pub use engine::{score_all, score_candles};
pub use error::DataError;
pub use profile::{EngineMode, EngineProfile, ProfileOverrides};
pub use scoring::score_timeframe;
pub use types::{
    Breakdown, Candle, CandleType, EnrichedCandle, Flags, OverallResult, RawSeries, ScoreBundle,
    TimeframeResult, TimeframeScore, TimeframeSeries,
};
