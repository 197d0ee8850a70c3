//! Scheduling parameters for a run.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::kernel::{SchedulingAlgorithm, VictimPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub algorithm: SchedulingAlgorithm,
    /// Instructions per round-robin turn.
    pub time_quantum: u32,
    pub victim_policy: VictimPolicy,
    /// Deadlocks broken before a run that keeps deadlocking is declared stalled.
    pub max_deadlock_resolutions: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            algorithm: SchedulingAlgorithm::Priority,
            time_quantum: 1,
            victim_policy: VictimPolicy::LargestPriorityValue,
            max_deadlock_resolutions: 1000,
        }
    }
}

impl SimulationConfig {
    /// Reads a TOML config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_quantum == 0 {
            return Err(ConfigError::ZeroQuantum);
        }
        Ok(())
    }
}
