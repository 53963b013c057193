//! CLI-specific error types

use gh_plugin_registry::{ConfigError, RegistryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Signing key error: {0}")]
    SigningKeys(#[from] RegistryError),

    #[error("Failed to read public key file {path}: {source}")]
    KeyFile {
        path: String,
        source: std::io::Error,
    },

    #[error("No public key files provided")]
    NoKeyFiles,

    #[error("Server error: {0}")]
    Server(#[from] anyhow::Error),
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::NoKeyFiles => 2,
            _ => 1,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
