//! Server configuration.

use crate::error::ConfigError;
use crate::registry::ExpiryPolicy;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Runtime configuration, read from TOML.
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Tracing filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    log_filter: String,

    /// Seconds a session may wait for its second player before it is
    /// reclaimed. Unset means never.
    #[serde(default)]
    awaiting_timeout_secs: Option<u64>,

    /// Seconds a finished session is retained. Unset means forever.
    #[serde(default)]
    finished_retention_secs: Option<u64>,

    /// Seconds between expiry sweeps in `serve` mode.
    #[serde(default = "default_sweep_interval_secs")]
    sweep_interval_secs: u64,
}

#[instrument]
fn default_log_filter() -> String {
    "info,matchwarden_server=debug".to_string()
}

#[instrument]
fn default_sweep_interval_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            awaiting_timeout_secs: None,
            finished_retention_secs: None,
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        info!(?config, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if given and present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::from_file(path),
            Some(path) => {
                info!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Expiry policy derived from the timeout settings.
    pub fn expiry_policy(&self) -> ExpiryPolicy {
        ExpiryPolicy {
            awaiting_ttl: self.awaiting_timeout_secs.map(Duration::from_secs),
            finished_ttl: self.finished_retention_secs.map(Duration::from_secs),
        }
    }

    /// Sweep period, never shorter than one second.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"").unwrap();
        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.expiry_policy(), ExpiryPolicy::default());
    }

    #[test]
    fn test_timeouts_become_policy() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "awaiting_timeout_secs = 120").unwrap();
        writeln!(file, "finished_retention_secs = 600").unwrap();
        writeln!(file, "sweep_interval_secs = 0").unwrap();
        let config = ServerConfig::from_file(file.path()).unwrap();

        assert_eq!(
            config.expiry_policy(),
            ExpiryPolicy {
                awaiting_ttl: Some(Duration::from_secs(120)),
                finished_ttl: Some(Duration::from_secs(600)),
            }
        );
        assert_eq!(config.sweep_interval(), Duration::from_secs(1));
        assert_eq!(config.log_filter(), "info,matchwarden_server=debug");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sweep_interval_secs = \"soon\"").unwrap();
        let err = ServerConfig::from_file(file.path()).unwrap_err();
        assert!(err.message.contains("Failed to parse config"));
    }

    #[test]
    fn test_missing_path_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, ServerConfig::default());
    }
}
