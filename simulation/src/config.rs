//! Session configuration loaded from TOML.

use std::time::Duration;

use coop_defence_system_wave_scheduling::DEFAULT_WAVE_COUNT;
use coop_defence_world::{STARTING_GOLD, STARTING_LIVES};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;
const DEFAULT_TICK_MILLIS: u64 = 16;

/// Tunables for a simulation session.
///
/// Every field is optional in TOML; missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Gold available before the first purchase.
    pub starting_gold: u32,
    /// Lives available before the first leak.
    pub starting_lives: u32,
    /// Seed for wave spawn-time jitter.
    pub seed: u64,
    /// Number of waves generated up front.
    pub waves: usize,
    /// Fixed tick length used by headless runners, in milliseconds.
    pub tick_millis: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            starting_gold: STARTING_GOLD,
            starting_lives: STARTING_LIVES,
            seed: DEFAULT_SEED,
            waves: DEFAULT_WAVE_COUNT,
            tick_millis: DEFAULT_TICK_MILLIS,
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        if config.tick_millis == 0 {
            return Err(ConfigError::ZeroTick);
        }
        Ok(config)
    }

    /// Fixed tick length as a duration.
    #[must_use]
    pub fn tick_duration(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

/// Errors raised while loading a [`SimulationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The text is not valid TOML for the configuration schema.
    #[error("failed to parse simulation config")]
    Parse(#[from] toml::de::Error),
    /// The tick length was zero.
    #[error("tick_millis must be greater than zero")]
    ZeroTick,
}
