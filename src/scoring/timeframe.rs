// =============================================================================
// Timeframe Scorer: One window in, one blended score out
// =============================================================================

use tracing::trace;

use super::candle_engine::candle_structure_score;
use super::guardrails::apply_guardrails;
use super::macd_score::macd_score;
use super::rsi_trio::rsi_trio_score;
use super::round2;
use crate::profile::EngineProfile;
use crate::types::{Breakdown, EnrichedCandle, Flags, TimeframeScore};

pub const MAX_REASONS: usize = 8;
pub const INSUFFICIENT_HISTORY: &str = "insufficient_history";

impl TimeframeScore {
    /// Default returned for windows shorter than the profile's minimum history.
    pub fn neutral() -> Self {
        Self {
            score: 50.0,
            breakdown: Breakdown::default(),
            reasons: vec![INSUFFICIENT_HISTORY.to_string()],
            flags: Flags::default(),
        }
    }
}

/// Score a single enriched window (oldest first).
pub fn score_timeframe(candles: &[EnrichedCandle], profile: &EngineProfile) -> TimeframeScore {
    if candles.len() < profile.required_history() {
        return TimeframeScore::neutral();
    }

    let ce = candle_structure_score(candles, profile);
    let rsi = rsi_trio_score(candles, profile);
    let mac = macd_score(candles, profile);
    let guard = apply_guardrails(candles, rsi.flags, mac.score, profile);

    let b = &profile.blend;
    let blended = b.candle_engine * ce.score + b.rsi_trio * rsi.sub.score + b.macd * mac.score;
    let score = round2((blended * guard.mult).max(guard.floor).min(guard.cap));

    let mut reasons: Vec<String> = Vec::with_capacity(MAX_REASONS);
    for reason in rsi
        .sub
        .reasons
        .into_iter()
        .chain(mac.reasons)
        .chain(ce.reasons)
        .chain(guard.reasons)
    {
        if reasons.len() == MAX_REASONS {
            break;
        }
        if !reasons.contains(&reason) {
            reasons.push(reason);
        }
    }

    trace!(
        bars = candles.len(),
        ce = ce.score,
        rsi = rsi.sub.score,
        macd = mac.score,
        mult = guard.mult,
        score,
        "timeframe scored"
    );

    TimeframeScore {
        score,
        breakdown: Breakdown {
            candle_engine: ce.score,
            rsi_trio: rsi.sub.score,
            macd: mac.score,
        },
        reasons,
        flags: rsi.flags,
    }
}
