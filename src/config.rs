//! Application configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_with::serde_as;
use tracing::warn;

use crate::client::FallbackPolicy;
use crate::errors::TrackerError;
use crate::simulation;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub tracker: TrackerConfig,
    pub store: StoreConfig,
}

#[serde_as]
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrackerConfig {
    /// Seconds between poll cycles.
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub poll_interval: Duration,
    /// What to serve when the remote fetch is unusable.
    pub fallback: FallbackPolicy,
    /// Artificial delay before synthetic data on the unconfigured path,
    /// in milliseconds.
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub simulated_latency: Duration,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    /// Where the server-connection record is kept.
    pub path: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            fallback: FallbackPolicy::default(),
            simulated_latency: simulation::SIMULATED_LATENCY,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/traccar.json"),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                Environment::with_prefix("ROLLOFF")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl TrackerConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.poll_interval.is_zero() {
            return Err(TrackerError::ConfigurationError {
                message: "Poll interval must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

impl StoreConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), TrackerError> {
        self.validate_path()?;
        self.ensure_directory_exists(self.path.parent().ok_or_else(|| {
            TrackerError::ConfigurationError {
                message: "Could not get parent directory".to_string(),
            }
        })?)?;
        Ok(())
    }

    fn validate_path(&self) -> Result<(), TrackerError> {
        if self.path.to_str().unwrap_or("").is_empty() {
            return Err(TrackerError::ConfigurationError {
                message: "Store path cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    fn ensure_directory_exists(&self, dir: &Path) -> Result<(), TrackerError> {
        if !dir.exists() {
            warn!("Store directory does not exist, attempting to create it");
            std::fs::create_dir_all(dir).map_err(|e| TrackerError::ConfigurationError {
                message: format!("Could not create store directory: {}", e),
            })?;
        }
        Ok(())
    }
}
