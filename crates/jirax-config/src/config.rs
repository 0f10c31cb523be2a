//! Receiver configuration.

use crate::error::{ConfigError, Result};
use jirax_core::Strictness;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory name for jirax configuration.
const JIRAX_DIR: &str = ".jirax";
/// Configuration file name.
const CONFIG_FILE: &str = "config.yml";

/// Receiver configuration stored in `.jirax/config.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Configuration version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Decoding settings.
    #[serde(default)]
    pub decode: DecodeSettings,

    /// HTTP receiver settings.
    #[serde(default)]
    pub server: ServerSettings,
}

fn default_version() -> u32 {
    1
}

/// Decoding settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeSettings {
    #[serde(default)]
    pub strictness: Strictness,
}

/// Where the webhook receiver listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    17474
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            decode: DecodeSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

impl ReceiverConfig {
    /// The configuration file path under `dir`.
    #[must_use]
    pub fn path(dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(JIRAX_DIR).join(CONFIG_FILE)
    }

    /// Write a default configuration under `dir`.
    ///
    /// # Errors
    /// Returns error if a configuration already exists or IO fails.
    pub fn init(dir: impl AsRef<Path>) -> Result<Self> {
        let path = Self::path(&dir);
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path));
        }
        fs::create_dir_all(dir.as_ref().join(JIRAX_DIR))?;

        let config = Self::default();
        config.save(&dir)?;

        info!(path = %path.display(), "Initialized configuration");
        Ok(config)
    }

    /// Read the configuration under `dir`.
    ///
    /// # Errors
    /// Returns error if there is no configuration or it does not parse.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let path = Self::path(&dir);
        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }

        let content = fs::read_to_string(&path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        debug!(path = %path.display(), strictness = %config.decode.strictness, "Loaded configuration");
        Ok(config)
    }

    /// Read the configuration under `dir`, or use defaults if there is none.
    ///
    /// # Errors
    /// Returns error if a configuration exists but cannot be read.
    pub fn load_or_default(dir: impl AsRef<Path>) -> Result<Self> {
        match Self::open(&dir) {
            Err(ConfigError::NotFound(path)) => {
                debug!(path = %path.display(), "No configuration, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Write this configuration under `dir`, replacing any existing file.
    ///
    /// # Errors
    /// Returns error if serialization or IO fails.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let path = Self::path(dir);
        fs::write(&path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// The socket address the receiver binds to.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidAddress` if host and port do not form one.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_init_and_open() {
        let tmp = TempDir::new().unwrap();

        let created = ReceiverConfig::init(tmp.path()).unwrap();
        assert!(tmp.path().join(".jirax/config.yml").exists());

        let opened = ReceiverConfig::open(tmp.path()).unwrap();
        assert_eq!(created, opened);
        assert_eq!(opened.decode.strictness, Strictness::Strict);
    }

    #[test]
    fn test_init_twice_fails() {
        let tmp = TempDir::new().unwrap();
        ReceiverConfig::init(tmp.path()).unwrap();

        let err = ReceiverConfig::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(_)));
    }

    #[test]
    fn test_open_missing() {
        let tmp = TempDir::new().unwrap();

        let err = ReceiverConfig::open(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));

        let config = ReceiverConfig::load_or_default(tmp.path()).unwrap();
        assert_eq!(config, ReceiverConfig::default());
    }

    #[test]
    fn test_partial_file_takes_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(".jirax")).unwrap();
        fs::write(
            ReceiverConfig::path(tmp.path()),
            "decode:\n  strictness: ignore\nserver:\n  port: 8080\n",
        )
        .unwrap();

        let config = ReceiverConfig::open(tmp.path()).unwrap();

        assert_eq!(config.version, 1);
        assert_eq!(config.decode.strictness, Strictness::Ignore);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.listen_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_invalid_file() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(".jirax")).unwrap();
        fs::write(
            ReceiverConfig::path(tmp.path()),
            "decode:\n  strictness: sometimes\n",
        )
        .unwrap();

        let err = ReceiverConfig::load_or_default(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_invalid_listen_addr() {
        let mut config = ReceiverConfig::default();
        config.server.host = "not a host".to_string();

        assert!(matches!(
            config.listen_addr(),
            Err(ConfigError::InvalidAddress(_))
        ));
    }
}
