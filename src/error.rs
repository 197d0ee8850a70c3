use std::path::PathBuf;

use thiserror::Error;

/// Failures of a single request or release. Never fatal to the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("resource not found: {resource}")]
    NotFound { resource: String },

    #[error("{process} does not hold {resource}")]
    NotHeld { process: String, resource: String },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {directive} is missing a value")]
    MissingValue { line: usize, directive: String },

    #[error("line {line}: invalid value {value:?}")]
    InvalidValue { line: usize, value: String },

    #[error("line {line}: unknown directive {directive:?}")]
    UnknownDirective { line: usize, directive: String },

    #[error("line {line}: duplicate process {name}")]
    DuplicateProcess { line: usize, name: String },

    #[error("line {line}: duplicate resource {name}")]
    DuplicateResource { line: usize, name: String },

    #[error("process {name} is missing its END card")]
    UnterminatedProcess { name: String },

    #[error("line {line}: instruction outside of a process block")]
    InstructionOutsideProcess { line: usize },

    #[error("line {line}: END card without PROCESS")]
    EndWithoutProcess { line: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown scheduling algorithm {0} (expected 0 = priority, 1 = round-robin)")]
    InvalidAlgorithm(u8),

    #[error("time quantum must be positive")]
    ZeroQuantum,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
