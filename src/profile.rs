// =============================================================================
// Engine Profiles: Parameter sets for scalp and swing scoring
// =============================================================================
//
// A profile is an immutable value object passed into every scoring call. The
// scorer, dynamics tracker and aggregator only ever read its fields; the two
// canonical profiles differ purely in data.
//
//   scalp  short horizon, RSI-heavy blend, session-anchored VWAP
//   swing  1h/4h horizon, balanced blend, EMA50/EMA200 structure term
// =============================================================================

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Fewest bars the candle-structure stage can work with.
pub const MIN_SCORABLE_HISTORY: usize = 3;

// =============================================================================
// Sub-configurations
// =============================================================================

/// Final blend of the three sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    pub candle_engine: f64,
    pub rsi_trio: f64,
    pub macd: f64,
}

/// Trio of timeframes whose agreement earns the synergy adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyConfig {
    pub trio: [String; 3],
    /// Score at or above which a trio member counts as bullish.
    pub bullish: f64,
    /// Score at or below which a trio member counts as bearish.
    pub bearish: f64,
    pub full_bonus: f64,
    pub partial_bonus: f64,
    pub conflict_penalty: f64,
}

/// Velocity concordance accent layered on top of synergy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthConfig {
    pub pair: [String; 2],
    pub helper: String,
    pub pair_bonus: f64,
    pub helper_bonus: f64,
}

/// Structural anchor a stretch check measures distance from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Vwap,
    Ema20,
    Ema50,
    Ema200,
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vwap => write!(f, "VWAP"),
            Self::Ema20 => write!(f, "EMA20"),
            Self::Ema50 => write!(f, "EMA50"),
            Self::Ema200 => write!(f, "EMA200"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StretchLimit {
    pub anchor: Anchor,
    /// Maximum |close - anchor| / anchor before the stretch dampener fires.
    pub max_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailConfig {
    /// Score cap when overbought and MACD is not confirming.
    pub overbought_cap: f64,
    /// Score floor when oversold and MACD is improving.
    pub oversold_floor: f64,
    pub stretch: Vec<StretchLimit>,
    pub stretch_dampen: f64,
    pub participation_dampen: f64,
    /// Bars in the trailing range median.
    pub range_median_len: usize,
    /// Last range below this fraction of the median counts as thin.
    pub min_range_ratio: f64,
    /// Last volume below this fraction of the volume EMA counts as thin.
    pub min_volume_ratio: f64,
}

/// Weights of the candle-structure terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandleWeights {
    pub body: f64,
    pub range_expansion: f64,
    pub wicks: f64,
    pub ema_stack: f64,
    pub ema_distance: f64,
    pub ema_slope: f64,
    pub ema_cross: f64,
    pub vwap_position: f64,
    pub vwap_reclaim: f64,
    pub pattern: f64,
    /// EMA50/EMA200 structural stack.
    pub long_stack: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleEngineConfig {
    pub weights: CandleWeights,
    /// Bonus for three strictly growing bullish bodies (mirrored for bears).
    pub growth_accent: f64,
    pub atr_len: usize,
    pub volume_ema_len: usize,
    /// Trailing bars whose ranges feed the range-expansion baseline.
    pub range_window: usize,
    pub range_ema_len: usize,
    /// Stack value when price is above / below both EMAs but they are not ordered.
    pub partial_stack: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiTrioConfig {
    pub overbought: f64,
    pub oversold: f64,
    /// Append "Overbought" / "Oversold" to the reasons when flagged.
    pub annotate_extremes: bool,
}

// =============================================================================
// EngineProfile
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineProfile {
    pub name: String,
    pub timeframe_weights: BTreeMap<String, f64>,
    pub blend: BlendWeights,
    pub synergy: SynergyConfig,
    pub growth: GrowthConfig,
    pub guardrails: GuardrailConfig,
    pub candle: CandleEngineConfig,
    pub rsi: RsiTrioConfig,
    /// Bars back for RSI and MACD slopes.
    pub lookback: usize,
    pub min_history: usize,
    pub use_session_vwap: bool,
    pub session_tz: Tz,
}

fn weights(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(tf, w)| (tf.to_string(), *w)).collect()
}

fn labels<const N: usize>(tfs: [&str; N]) -> [String; N] {
    tfs.map(str::to_string)
}

impl EngineProfile {
    /// Short-horizon profile: 1m..1d, 5m+15m+1h synergy trio.
    pub fn scalp() -> Self {
        Self {
            name: "scalp".to_string(),
            timeframe_weights: weights(&[
                ("1m", 0.30),
                ("5m", 0.27),
                ("15m", 0.20),
                ("1h", 0.13),
                ("4h", 0.06),
                ("1d", 0.04),
            ]),
            blend: BlendWeights {
                candle_engine: 0.35,
                rsi_trio: 0.45,
                macd: 0.20,
            },
            synergy: SynergyConfig {
                trio: labels(["5m", "15m", "1h"]),
                bullish: 55.0,
                bearish: 45.0,
                full_bonus: 6.0,
                partial_bonus: 3.0,
                conflict_penalty: 3.0,
            },
            growth: GrowthConfig {
                pair: labels(["5m", "15m"]),
                helper: "1h".to_string(),
                pair_bonus: 3.0,
                helper_bonus: 2.0,
            },
            guardrails: GuardrailConfig {
                overbought_cap: 70.0,
                oversold_floor: 30.0,
                stretch: vec![
                    StretchLimit { anchor: Anchor::Vwap, max_pct: 0.015 },
                    StretchLimit { anchor: Anchor::Ema20, max_pct: 0.02 },
                ],
                stretch_dampen: 0.95,
                participation_dampen: 0.95,
                range_median_len: 25,
                min_range_ratio: 0.5,
                min_volume_ratio: 0.6,
            },
            candle: CandleEngineConfig {
                weights: CandleWeights {
                    body: 0.28,
                    range_expansion: 0.12,
                    wicks: 0.05,
                    ema_stack: 0.14,
                    ema_distance: 0.06,
                    ema_slope: 0.10,
                    ema_cross: 0.08,
                    vwap_position: 0.17,
                    vwap_reclaim: 0.08,
                    pattern: 0.05,
                    long_stack: 0.0,
                },
                growth_accent: 0.12,
                atr_len: 20,
                volume_ema_len: 20,
                range_window: 25,
                range_ema_len: 20,
                partial_stack: 0.4,
            },
            rsi: RsiTrioConfig {
                overbought: 80.0,
                oversold: 20.0,
                annotate_extremes: false,
            },
            lookback: 3,
            min_history: 30,
            use_session_vwap: true,
            session_tz: chrono_tz::America::New_York,
        }
    }

    /// Longer-horizon profile: 15m..1d, 15m+1h+4h synergy trio.
    pub fn swing() -> Self {
        Self {
            name: "swing".to_string(),
            timeframe_weights: weights(&[("15m", 0.12), ("1h", 0.38), ("4h", 0.34), ("1d", 0.16)]),
            blend: BlendWeights {
                candle_engine: 0.40,
                rsi_trio: 0.40,
                macd: 0.20,
            },
            synergy: SynergyConfig {
                trio: labels(["15m", "1h", "4h"]),
                bullish: 57.0,
                bearish: 43.0,
                full_bonus: 6.0,
                partial_bonus: 3.0,
                conflict_penalty: 3.0,
            },
            growth: GrowthConfig {
                pair: labels(["1h", "4h"]),
                helper: "15m".to_string(),
                pair_bonus: 3.0,
                helper_bonus: 2.0,
            },
            guardrails: GuardrailConfig {
                overbought_cap: 75.0,
                oversold_floor: 25.0,
                stretch: vec![
                    StretchLimit { anchor: Anchor::Ema50, max_pct: 0.03 },
                    StretchLimit { anchor: Anchor::Ema200, max_pct: 0.05 },
                ],
                stretch_dampen: 0.95,
                participation_dampen: 0.95,
                range_median_len: 25,
                min_range_ratio: 0.5,
                min_volume_ratio: 0.6,
            },
            candle: CandleEngineConfig {
                weights: CandleWeights {
                    body: 0.18,
                    range_expansion: 0.08,
                    wicks: 0.0,
                    ema_stack: 0.18,
                    ema_distance: 0.0,
                    ema_slope: 0.06,
                    ema_cross: 0.0,
                    vwap_position: 0.08,
                    vwap_reclaim: 0.0,
                    pattern: 0.0,
                    long_stack: 0.12,
                },
                growth_accent: 0.0,
                atr_len: 50,
                volume_ema_len: 50,
                range_window: 30,
                range_ema_len: 20,
                partial_stack: 0.0,
            },
            rsi: RsiTrioConfig {
                overbought: 80.0,
                oversold: 20.0,
                annotate_extremes: true,
            },
            lookback: 5,
            min_history: 120,
            use_session_vwap: false,
            session_tz: chrono_tz::America::New_York,
        }
    }

    /// Bars a window needs before it is scored rather than defaulted.
    pub fn required_history(&self) -> usize {
        self.min_history.max(MIN_SCORABLE_HISTORY)
    }
}

impl Default for EngineProfile {
    fn default() -> Self {
        Self::scalp()
    }
}

// =============================================================================
// EngineMode
// =============================================================================

/// Which canonical profile is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EngineMode {
    #[default]
    Scalp,
    Swing,
}

impl EngineMode {
    pub fn profile(&self) -> EngineProfile {
        match self {
            Self::Scalp => EngineProfile::scalp(),
            Self::Swing => EngineProfile::swing(),
        }
    }
}

impl std::fmt::Display for EngineMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalp => write!(f, "scalp"),
            Self::Swing => write!(f, "swing"),
        }
    }
}

/// Unknown mode names sanitise to `Scalp`.
impl FromStr for EngineMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "swing" => Self::Swing,
            _ => Self::Scalp,
        })
    }
}

impl From<String> for EngineMode {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(mode) => mode,
            Err(never) => match never {},
        }
    }
}

impl From<EngineMode> for String {
    fn from(mode: EngineMode) -> Self {
        mode.to_string()
    }
}

// =============================================================================
// ProfileOverrides
// =============================================================================

/// Caller-level tweaks applied on top of a canonical profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileOverrides {
    #[serde(default)]
    pub session_tz: Option<Tz>,
    #[serde(default)]
    pub use_session_vwap: Option<bool>,
    #[serde(default)]
    pub timeframe_weights: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub synergy_bullish: Option<f64>,
    #[serde(default)]
    pub synergy_bearish: Option<f64>,
    #[serde(default)]
    pub min_history: Option<usize>,
}

impl ProfileOverrides {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply(&self, mut profile: EngineProfile) -> EngineProfile {
        if let Some(tz) = self.session_tz {
            profile.session_tz = tz;
        }
        if let Some(flag) = self.use_session_vwap {
            profile.use_session_vwap = flag;
        }
        if let Some(weights) = &self.timeframe_weights {
            profile.timeframe_weights = weights.clone();
        }
        if let Some(up) = self.synergy_bullish {
            profile.synergy.bullish = up;
        }
        if let Some(down) = self.synergy_bearish {
            profile.synergy.bearish = down;
        }
        if let Some(min) = self.min_history {
            profile.min_history = min;
        }
        profile
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blends_sum_to_one() {
        for profile in [EngineProfile::scalp(), EngineProfile::swing()] {
            let b = profile.blend;
            assert!((b.candle_engine + b.rsi_trio + b.macd - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn canonical_profiles_differ_in_data_only() {
        let scalp = EngineProfile::scalp();
        let swing = EngineProfile::swing();
        assert_eq!(scalp.synergy.trio, ["5m", "15m", "1h"]);
        assert_eq!(swing.synergy.trio, ["15m", "1h", "4h"]);
        assert_eq!(scalp.min_history, 30);
        assert_eq!(swing.min_history, 120);
        assert!(scalp.use_session_vwap && !swing.use_session_vwap);
        assert_eq!(scalp.candle.weights.long_stack, 0.0);
        assert!(swing.candle.weights.long_stack > 0.0);
        assert!(scalp.blend.rsi_trio > swing.blend.rsi_trio);
    }

    #[test]
    fn mode_parsing_sanitises_unknown_values() {
        assert_eq!("swing".parse::<EngineMode>().unwrap(), EngineMode::Swing);
        assert_eq!(" SWING ".parse::<EngineMode>().unwrap(), EngineMode::Swing);
        assert_eq!("turbo".parse::<EngineMode>().unwrap(), EngineMode::Scalp);
        let mode: EngineMode = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(mode, EngineMode::Scalp);
        assert_eq!(serde_json::to_string(&EngineMode::Swing).unwrap(), "\"swing\"");
    }

    #[test]
    fn overrides_replace_only_what_they_name() {
        let overrides = ProfileOverrides {
            synergy_bullish: Some(60.0),
            min_history: Some(50),
            session_tz: Some(Tz::UTC),
            ..Default::default()
        };
        let profile = overrides.apply(EngineProfile::scalp());
        assert_eq!(profile.synergy.bullish, 60.0);
        assert_eq!(profile.synergy.bearish, 45.0);
        assert_eq!(profile.min_history, 50);
        assert_eq!(profile.session_tz, Tz::UTC);
        assert_eq!(profile.timeframe_weights, EngineProfile::scalp().timeframe_weights);
    }

    #[test]
    fn required_history_has_a_floor() {
        let mut profile = EngineProfile::scalp();
        profile.min_history = 0;
        assert_eq!(profile.required_history(), MIN_SCORABLE_HISTORY);
    }

    #[test]
    fn profile_serde_roundtrip() {
        let swing = EngineProfile::swing();
        let json = serde_json::to_string(&swing).unwrap();
        let back: EngineProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, swing);
    }
}
