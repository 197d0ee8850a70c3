//! Command line interface definition

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::kernel::{SchedulingAlgorithm, VictimPolicy};

/// Simulates processes competing for exclusive resources, with deadlock recovery.
#[derive(Debug, Parser)]
#[command(name = "resource-manager")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Program file describing resources and processes
    pub program: PathBuf,

    /// Scheduling algorithm: 0 = static priority, 1 = round robin
    #[arg(short, long, value_name = "0|1")]
    pub algorithm: Option<u8>,

    /// Instructions per round-robin turn
    #[arg(short, long, value_name = "N")]
    pub quantum: Option<u32>,

    /// Which deadlock cycle member to restart
    #[arg(long, value_enum)]
    pub victim: Option<VictimArg>,

    /// TOML file with scheduling parameters
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VictimArg {
    /// Smallest priority value
    Smallest,
    /// Largest priority value
    Largest,
}

impl From<VictimArg> for VictimPolicy {
    fn from(arg: VictimArg) -> Self {
        match arg {
            VictimArg::Smallest => VictimPolicy::SmallestPriorityValue,
            VictimArg::Largest => VictimPolicy::LargestPriorityValue,
        }
    }
}

impl Cli {
    /// Config file (or defaults) with command line flags applied on top.
    pub fn resolve_config(&self) -> Result<SimulationConfig, ConfigError> {
        let mut config = SimulationConfig::load_or_default(self.config.as_deref())?;

        if let Some(selector) = self.algorithm {
            config.algorithm = SchedulingAlgorithm::try_from(selector)?;
        }
        if let Some(quantum) = self.quantum {
            config.time_quantum = quantum;
        }
        if let Some(victim) = self.victim {
            config.victim_policy = victim.into();
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_defaults() {
        let cli = Cli::parse_from(["resource-manager", "jobs.txt", "-a", "1", "-q", "4", "--victim", "smallest"]);
        let config = cli.resolve_config().unwrap();

        assert_eq!(cli.program, PathBuf::from("jobs.txt"));
        assert_eq!(config.algorithm, SchedulingAlgorithm::RoundRobin);
        assert_eq!(config.time_quantum, 4);
        assert_eq!(config.victim_policy, VictimPolicy::SmallestPriorityValue);
    }

    #[test]
    fn test_cli_invalid_algorithm() {
        let cli = Cli::parse_from(["resource-manager", "jobs.txt", "--algorithm", "7"]);
        assert!(matches!(cli.resolve_config(), Err(ConfigError::InvalidAlgorithm(7))));
    }

    #[test]
    fn test_cli_zero_quantum() {
        let cli = Cli::parse_from(["resource-manager", "jobs.txt", "--quantum", "0"]);
        assert!(matches!(cli.resolve_config(), Err(ConfigError::ZeroQuantum)));
    }
}
