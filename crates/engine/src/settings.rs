//! TOML settings for a game session.
//!
//! Every table and field is optional:
//!
//! ```toml
//! seed = 42
//!
//! [level]
//! rows = 9
//! cols = 7
//! palette_size = 4
//! max_moves = 25
//!
//! [scoring]
//! combo_timeout_secs = 1.5
//! size_bonus = [[5, 15], [8, 20], [10, 30]]
//!
//! [pipeline]
//! ack_timeout_ms = 400
//! max_shuffle_attempts = 50
//!
//! [runtime]
//! decay_tick_ms = 100
//! restart_delay_ms = 3000
//! auto_restart = true
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::core::{ConfigError, LevelConfig, ScoreRules};
use crate::pipeline::PipelineConfig;
use crate::runtime::RuntimeConfig;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// RNG seed; `None` derives one from the system clock
    pub seed: Option<u32>,
    pub level: LevelConfig,
    pub scoring: ScoreRules,
    pub pipeline: PipelineConfig,
    pub runtime: RuntimeConfig,
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.level.validate()?;
        self.scoring.validate()
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and validate a settings file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid settings in {}", path.display()))
    }

    /// The configured seed, or one taken from the wall clock
    pub fn seed_or_entropy(&self) -> u32 {
        self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
                .unwrap_or(1)
        })
    }
}
