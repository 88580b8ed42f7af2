// =============================================================================
// Cross-Timeframe Aggregation: Weighted overall score with synergy
// =============================================================================
//
// 1. Profile weights restricted to the timeframes present, renormalised
// 2. Weighted score / velocity / acceleration
// 3. Synergy adjustment from the profile's trio of timeframes
// 4. Growth accent from concordant velocities
// 5. Confidence from sign agreement and distance from neutral
// =============================================================================

use std::collections::BTreeMap;

use tracing::debug;

use crate::profile::{EngineProfile, GrowthConfig, SynergyConfig};
use crate::scoring::round2;
use crate::types::{OverallResult, TimeframeResult};

/// Synergy adjustment and its descriptive tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Synergy {
    pub adjustment: f64,
    pub tag: String,
}

impl Synergy {
    fn new(adjustment: f64, tag: impl Into<String>) -> Self {
        Self {
            adjustment,
            tag: tag.into(),
        }
    }
}

/// Restrict `weights` to `present` and rescale to sum to 1.
///
/// Only strictly positive weights count. When none of the present timeframes
/// carries a weight, every present timeframe gets an equal share.
pub fn normalize_weights<'a>(
    weights: &BTreeMap<String, f64>,
    present: impl IntoIterator<Item = &'a String>,
) -> BTreeMap<String, f64> {
    let present: Vec<&String> = present.into_iter().collect();
    let mut out: BTreeMap<String, f64> = present
        .iter()
        .filter_map(|tf| match weights.get(*tf) {
            Some(&w) if w > 0.0 => Some(((*tf).clone(), w)),
            _ => None,
        })
        .collect();

    let sum: f64 = out.values().sum();
    if sum > 0.0 {
        for w in out.values_mut() {
            *w /= sum;
        }
    } else if !present.is_empty() {
        let share = 1.0 / present.len() as f64;
        out = present.into_iter().map(|tf| (tf.clone(), share)).collect();
    }
    out
}

/// +1 bullish, -1 bearish, 0 neutral.
fn classify(score: f64, cfg: &SynergyConfig) -> i8 {
    if score >= cfg.bullish {
        1
    } else if score <= cfg.bearish {
        -1
    } else {
        0
    }
}

/// Agreement pattern of the trio of timeframes.
pub fn synergy_bonus(per: &BTreeMap<String, TimeframeResult>, cfg: &SynergyConfig) -> Synergy {
    let [a, b, c] = &cfg.trio;
    let (Some(ra), Some(rb), Some(rc)) = (per.get(a), per.get(b), per.get(c)) else {
        return Synergy::new(0.0, "synergy:insufficient");
    };

    let signs = [ra.score, rb.score, rc.score].map(|s| classify(s, cfg));
    let bulls = signs.iter().filter(|&&s| s > 0).count();
    let bears = signs.iter().filter(|&&s| s < 0).count();
    let trio = format!("{a}+{b}+{c}");

    match (bulls, bears) {
        (3, _) => Synergy::new(cfg.full_bonus, format!("synergy:{trio} bullish")),
        (_, 3) => Synergy::new(-cfg.full_bonus, format!("synergy:{trio} bearish")),
        (2, 0) => Synergy::new(cfg.partial_bonus, "synergy:two strong, one neutral"),
        (0, 2) => Synergy::new(-cfg.partial_bonus, "synergy:two strong, one neutral"),
        (up, down) if up > 0 && down > 0 => Synergy::new(
            -cfg.conflict_penalty,
            format!("synergy:conflict across {trio}"),
        ),
        _ => Synergy::new(0.0, "synergy:mixed"),
    }
}

/// Bonus when the pair (and optionally the helper) move in the same direction.
pub fn growth_accent(per: &BTreeMap<String, TimeframeResult>, cfg: &GrowthConfig) -> f64 {
    let [a, b] = &cfg.pair;
    let (Some(ra), Some(rb)) = (per.get(a), per.get(b)) else {
        return 0.0;
    };
    let (va, vb) = (ra.velocity, rb.velocity);
    let helper = per.get(&cfg.helper).map(|r| r.velocity);

    let mut adj = 0.0;
    if va > 0.0 && vb > 0.0 {
        adj += cfg.pair_bonus;
        if helper.is_some_and(|v| v > 0.0) {
            adj += cfg.helper_bonus;
        }
    } else if va < 0.0 && vb < 0.0 {
        adj -= cfg.pair_bonus;
        if helper.is_some_and(|v| v < 0.0) {
            adj -= cfg.helper_bonus;
        }
    }
    adj
}

/// Confidence in [0, 1]: half sign agreement with `overall`, half magnitude.
pub fn confidence_score(
    per: &BTreeMap<String, TimeframeResult>,
    overall: f64,
    weights: &BTreeMap<String, f64>,
) -> f64 {
    let overall_up = overall >= 50.0;
    let (mut agree, mut magnitude, mut wsum) = (0.0, 0.0, 0.0);

    for (tf, row) in per {
        let w = weights.get(tf).copied().unwrap_or(0.0);
        if w <= 0.0 {
            continue;
        }
        if (row.score >= 50.0) == overall_up {
            agree += w;
        }
        magnitude += w * ((row.score - 50.0).abs() / 50.0).min(1.0);
        wsum += w;
    }

    if wsum <= 0.0 {
        return 0.0;
    }
    (0.5 * (agree / wsum) + 0.5 * (magnitude / wsum)).clamp(0.0, 1.0)
}

pub fn aggregate(per: &BTreeMap<String, TimeframeResult>, profile: &EngineProfile) -> OverallResult {
    let weights = normalize_weights(&profile.timeframe_weights, per.keys());

    let (mut base, mut velocity, mut accel) = (0.0, 0.0, 0.0);
    for (tf, row) in per {
        let w = weights.get(tf).copied().unwrap_or(0.0);
        base += w * row.score;
        velocity += w * row.velocity;
        accel += w * row.accel;
    }

    let synergy = synergy_bonus(per, &profile.synergy);
    let growth = growth_accent(per, &profile.growth);
    let overall = (base + synergy.adjustment + growth).clamp(0.0, 100.0);
    let confidence = confidence_score(per, overall, &weights);

    debug!(
        profile = %profile.name,
        timeframes = per.len(),
        base = round2(base),
        synergy = synergy.adjustment,
        growth,
        overall = round2(overall),
        "aggregated timeframes"
    );

    OverallResult {
        score: round2(overall),
        velocity: round2(velocity),
        accel: round2(accel),
        confidence: round2(confidence),
        synergy: synergy.tag,
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Breakdown, Flags};

    fn row(score: f64, velocity: f64) -> TimeframeResult {
        TimeframeResult {
            score,
            velocity,
            accel: 0.0,
            reasons: Vec::new(),
            flags: Flags::default(),
            breakdown: Breakdown::default(),
        }
    }

    fn trio(scores: [f64; 3]) -> BTreeMap<String, TimeframeResult> {
        ["5m", "15m", "1h"]
            .iter()
            .zip(scores)
            .map(|(tf, s)| (tf.to_string(), row(s, 0.0)))
            .collect()
    }

    #[test]
    fn synergy_all_bullish() {
        let s = synergy_bonus(&trio([60.0, 62.0, 58.0]), &EngineProfile::scalp().synergy);
        assert_eq!(s.adjustment, 6.0);
        assert!(s.tag.contains("bullish"));
    }

    #[test]
    fn synergy_all_bearish() {
        let s = synergy_bonus(&trio([40.0, 30.0, 45.0]), &EngineProfile::scalp().synergy);
        assert_eq!(s.adjustment, -6.0);
        assert!(s.tag.contains("bearish"));
    }

    #[test]
    fn synergy_two_strong_one_neutral() {
        let cfg = EngineProfile::scalp().synergy;
        let s = synergy_bonus(&trio([60.0, 62.0, 50.0]), &cfg);
        assert_eq!(s.adjustment, 3.0);
        assert_eq!(s.tag, "synergy:two strong, one neutral");
        let s = synergy_bonus(&trio([50.0, 40.0, 41.0]), &cfg);
        assert_eq!(s.adjustment, -3.0);
    }

    #[test]
    fn synergy_conflict() {
        let s = synergy_bonus(&trio([60.0, 40.0, 50.0]), &EngineProfile::scalp().synergy);
        assert_eq!(s.adjustment, -3.0);
        assert!(s.tag.contains("conflict"));
    }

    #[test]
    fn synergy_mixed_and_insufficient() {
        let cfg = EngineProfile::scalp().synergy;
        let s = synergy_bonus(&trio([60.0, 50.0, 50.0]), &cfg);
        assert_eq!(s, Synergy::new(0.0, "synergy:mixed"));
        let mut per = trio([60.0, 62.0, 58.0]);
        per.remove("1h");
        assert_eq!(synergy_bonus(&per, &cfg).tag, "synergy:insufficient");
    }

    #[test]
    fn weights_renormalise_to_present() {
        let profile = EngineProfile::scalp();
        let present = vec!["5m".to_string(), "1h".to_string()];
        let w = normalize_weights(&profile.timeframe_weights, &present);
        assert_eq!(w.len(), 2);
        assert!((w.values().sum::<f64>() - 1.0).abs() < 1e-10);
        assert!((w["5m"] / w["1h"] - 0.27 / 0.13).abs() < 1e-10);
    }

    #[test]
    fn weights_fall_back_to_equal() {
        let profile = EngineProfile::swing();
        let present = vec!["1m".to_string(), "3m".to_string()];
        let w = normalize_weights(&profile.timeframe_weights, &present);
        assert!((w["1m"] - 0.5).abs() < 1e-10);
        assert!((w["3m"] - 0.5).abs() < 1e-10);
    }

    #[test]
    fn growth_accent_pair_and_helper() {
        let cfg = EngineProfile::scalp().growth;
        let mut per: BTreeMap<String, TimeframeResult> = BTreeMap::new();
        per.insert("5m".into(), row(55.0, 1.0));
        per.insert("15m".into(), row(55.0, 0.5));
        assert_eq!(growth_accent(&per, &cfg), 3.0);
        per.insert("1h".into(), row(55.0, 0.2));
        assert_eq!(growth_accent(&per, &cfg), 5.0);
        per.insert("1h".into(), row(55.0, -0.2));
        assert_eq!(growth_accent(&per, &cfg), 3.0);
        per.insert("15m".into(), row(55.0, -0.5));
        assert_eq!(growth_accent(&per, &cfg), 0.0);
    }

    #[test]
    fn confidence_bounds() {
        let per = trio([100.0, 100.0, 100.0]);
        let w = normalize_weights(&EngineProfile::scalp().timeframe_weights, per.keys());
        assert!((confidence_score(&per, 100.0, &w) - 1.0).abs() < 1e-10);
        let per = trio([50.0, 50.0, 50.0]);
        assert!((confidence_score(&per, 50.0, &w) - 0.5).abs() < 1e-10);
        assert_eq!(confidence_score(&per, 50.0, &BTreeMap::new()), 0.0);
    }

    #[test]
    fn aggregate_clamps_and_tags() {
        let per = trio([99.0, 99.0, 99.0]);
        let out = aggregate(&per, &EngineProfile::scalp());
        assert_eq!(out.score, 100.0);
        assert!(out.synergy.ends_with("bullish"));
        assert!((0.0..=1.0).contains(&out.confidence));
    }
}
