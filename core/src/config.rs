//! Engine tunables. Every field has a default so an empty or partial
//! `engine.json` is valid; a missing file means "all defaults".

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_STARTING_ATOMS_PER_SECOND: f64 = 1000.0;
pub const DEFAULT_PRESTIGE_RESTART_ATOMS_PER_SECOND: f64 = 100.0;
pub const DEFAULT_PRESTIGE_RATE: f64 = 0.007;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Production rate of a brand-new game.
    pub starting_atoms_per_second: f64,
    /// Production rate right after a prestige reset.
    pub prestige_restart_atoms_per_second: f64,
    /// Multiplier gained per qualifying upgrade at prestige time.
    pub prestige_rate: f64,
    /// An upgrade qualifies for prestige when `purchased > threshold`.
    pub prestige_count_threshold: u32,
    /// Live tick period. The tick itself always credits one second.
    pub tick_interval_ms: u64,
    pub autosave_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_atoms_per_second:         DEFAULT_STARTING_ATOMS_PER_SECOND,
            prestige_restart_atoms_per_second: DEFAULT_PRESTIGE_RESTART_ATOMS_PER_SECOND,
            prestige_rate:                     DEFAULT_PRESTIGE_RATE,
            prestige_count_threshold:          1,
            tick_interval_ms:                  1_000,
            autosave_interval_ms:              5_000,
        }
    }
}

impl EngineConfig {
    /// Load `engine.json` from `path`. A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("config: {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(self.starting_atoms_per_second >= 0.0) || !self.starting_atoms_per_second.is_finite() {
            anyhow::bail!("starting_atoms_per_second must be a finite value >= 0");
        }
        if !(self.prestige_restart_atoms_per_second >= 0.0)
            || !self.prestige_restart_atoms_per_second.is_finite()
        {
            anyhow::bail!("prestige_restart_atoms_per_second must be a finite value >= 0");
        }
        if !(self.prestige_rate >= 0.0) || !self.prestige_rate.is_finite() {
            anyhow::bail!("prestige_rate must be a finite value >= 0");
        }
        if self.tick_interval_ms == 0 || self.autosave_interval_ms == 0 {
            anyhow::bail!("timer intervals must be > 0");
        }
        Ok(())
    }
}
