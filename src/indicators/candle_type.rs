// =============================================================================
// Candle Shape Classifier
// =============================================================================
//
// Classifies one bar from its body / wick proportions. Rules are evaluated
// top-to-bottom; first match wins:
//
//   1. doji            body <= 10% of range
//   2. marubozu        body >= 90% of range
//   3. hammer / hanging man
//                      lower wick >= 50% of range AND body <= 30%
//   4. inverted hammer / shooting star
//                      upper wick >= 1.5x body AND lower wick <= 15% of range
//                      AND body <= 40% of range
//   5. spinning top    body <= 30% AND both wicks >= 20%
//   6. bullish / bearish
//
// Direction for the two-sided rules is close vs open.
// =============================================================================

use crate::types::CandleType;

/// Range floor so a zero-range bar classifies instead of dividing by zero.
const RANGE_EPSILON: f64 = 1e-12;

const DOJI_MAX_BODY: f64 = 0.10;
const MARUBOZU_MIN_BODY: f64 = 0.90;
const HAMMER_MIN_LOWER: f64 = 0.50;
const HAMMER_MAX_BODY: f64 = 0.30;
const STAR_UPPER_TO_BODY: f64 = 1.5;
const STAR_MAX_LOWER: f64 = 0.15;
const STAR_MAX_BODY: f64 = 0.40;
const SPIN_MAX_BODY: f64 = 0.30;
const SPIN_MIN_WICK: f64 = 0.20;

pub fn candle_type(open: f64, high: f64, low: f64, close: f64) -> CandleType {
    let body = (close - open).abs();
    let range = (high - low).max(RANGE_EPSILON);
    let upper = high - open.max(close);
    let lower = open.min(close) - low;

    let body_ratio = body / range;
    let lower_ratio = lower / range;
    let upper_ratio = upper / range;
    let bullish = close > open;

    if body_ratio <= DOJI_MAX_BODY {
        return CandleType::Doji;
    }

    if body_ratio >= MARUBOZU_MIN_BODY {
        return if bullish {
            CandleType::BullishMarubozu
        } else {
            CandleType::BearishMarubozu
        };
    }

    if lower_ratio >= HAMMER_MIN_LOWER && body_ratio <= HAMMER_MAX_BODY {
        return if bullish {
            CandleType::Hammer
        } else {
            CandleType::HangingMan
        };
    }

    if upper >= STAR_UPPER_TO_BODY * body
        && lower_ratio <= STAR_MAX_LOWER
        && body_ratio <= STAR_MAX_BODY
    {
        return if bullish {
            CandleType::InvertedHammer
        } else {
            CandleType::ShootingStar
        };
    }

    if body_ratio <= SPIN_MAX_BODY && upper_ratio >= SPIN_MIN_WICK && lower_ratio >= SPIN_MIN_WICK {
        return CandleType::SpinningTop;
    }

    if bullish {
        CandleType::Bullish
    } else {
        CandleType::Bearish
    }
}
