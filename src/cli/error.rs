//! CLI-specific error types

use lazy_version::{ConfigError, LookupError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid arguments: {0}")]
    Usage(String),
}

impl CliError {
    /// Exit status reported to the shell
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 2,
            _ => 1,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
