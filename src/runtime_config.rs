// =============================================================================
// Runtime Configuration: Active engine mode and profile overrides
// =============================================================================
//
// Selects which canonical profile is active and layers caller overrides on
// top. The scoring core never reads this file; callers resolve a profile with
// `active_profile()` and pass it in.
//
// Persistence uses an atomic tmp + rename pattern. All fields carry
// `#[serde(default)]` so older or partial files still load.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::profile::{EngineMode, EngineProfile, ProfileOverrides};

pub const DEFAULT_SETTINGS_PATH: &str = "engine_settings.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// `scalp` or `swing`; anything else reads as `scalp`.
    #[serde(default)]
    pub mode: EngineMode,

    #[serde(default, skip_serializing_if = "ProfileOverrides::is_empty")]
    pub overrides: ProfileOverrides,
}

impl EngineSettings {
    /// Canonical profile for `mode` with the overrides applied.
    pub fn active_profile(&self) -> EngineProfile {
        self.overrides.apply(self.mode.profile())
    }

    /// Load settings from a JSON file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine settings from {}", path.display()))?;

        let settings: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine settings from {}", path.display()))?;

        info!(
            path = %path.display(),
            mode = %settings.mode,
            overrides = !settings.overrides.is_empty(),
            "engine settings loaded"
        );

        Ok(settings)
    }

    /// Persist to `path` by writing a `.tmp` sibling and renaming it over.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine settings to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp settings to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp settings to {}", path.display()))?;

        info!(path = %path.display(), mode = %self.mode, "engine settings saved (atomic)");
        Ok(())
    }
}
