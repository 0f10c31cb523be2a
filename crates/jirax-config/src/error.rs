//! Error types for configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while reading or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file under the directory.
    #[error("no jirax configuration found at '{0}'")]
    NotFound(PathBuf),

    /// A configuration file is already there.
    #[error("jirax configuration already exists at '{0}'")]
    AlreadyExists(PathBuf),

    /// The configured listen address does not parse.
    #[error("invalid listen address '{0}'")]
    InvalidAddress(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
