// =============================================================================
// tf-strength: Batch scoring entry point
// =============================================================================
//
// Usage: tf-strength <bundle.json>...
//
// Loads the engine settings, scores every bundle file on the blocking pool and
// prints one JSON document per bundle on stdout.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use futures_util::future::join_all;
use serde_json::json;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tf_strength::bundle::CandleBundle;
use tf_strength::engine::score_candles;
use tf_strength::profile::EngineProfile;
use tf_strength::runtime_config::{EngineSettings, DEFAULT_SETTINGS_PATH};

fn score_file(path: &Path, profile: &EngineProfile) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read candle bundle {}", path.display()))?;
    let bundle = CandleBundle::from_json(&text)
        .with_context(|| format!("failed to decode candle bundle {}", path.display()))?;
    let symbol = bundle.symbol.clone();
    let series = bundle
        .into_series()
        .with_context(|| format!("invalid candles in {}", path.display()))?;
    let result = score_candles(&series, profile)
        .with_context(|| format!("failed to score {}", path.display()))?;

    info!(
        symbol = %symbol,
        timeframes = result.per_timeframe.len(),
        score = result.overall.score,
        confidence = result.overall.confidence,
        synergy = %result.overall.synergy,
        "bundle scored"
    );

    Ok(json!({ "symbol": symbol, "result": result }))
}

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings_path =
        std::env::var("ENGINE_SETTINGS").unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string());
    let settings = EngineSettings::load(&settings_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load engine settings, using defaults");
        EngineSettings::default()
    });
    let profile = settings.active_profile();

    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        anyhow::bail!("usage: tf-strength <bundle.json>...");
    }

    info!(mode = %settings.mode, bundles = paths.len(), "scoring bundles");

    // ── 2. Score bundles concurrently ────────────────────────────────────
    let tasks = paths.into_iter().map(|path| {
        let profile = profile.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = score_file(&path, &profile);
            (path, outcome)
        })
    });

    let mut failures = 0usize;
    for joined in join_all(tasks).await {
        match joined {
            Ok((_, Ok(doc))) => {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            }
            Ok((path, Err(e))) => {
                failures += 1;
                let cause = format!("{e:#}");
                error!(path = %path.display(), error = %cause, "bundle failed");
            }
            Err(e) => {
                failures += 1;
                error!(error = %e, "scoring task panicked");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} bundle(s) failed to score");
    }
    Ok(())
}
