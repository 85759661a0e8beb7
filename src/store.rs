//! Persisted tracking-server connection settings.

use std::fs;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::StoreConfig;
use crate::errors::TrackerError;

/// Connection settings for the remote tracking server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    pub url: String,
    pub username: String,
    pub password: String,
}

impl ServerConfig {
    /// A record with an empty URL counts as "not configured".
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }
}

/// Source of the persisted server configuration.
///
/// The client takes this as an injected dependency, so tests and embedders
/// can substitute their own backing storage.
pub trait ConfigStore: Send + Sync {
    /// Read the stored record. A missing or unparseable record is treated
    /// the same as no record at all.
    fn load(&self) -> Option<ServerConfig>;

    /// Persist the record, unconditionally overwriting any prior value.
    fn save(&self, config: &ServerConfig) -> Result<(), TrackerError>;
}

/// File-backed store keeping one JSON record, the settings-form storage of
/// the dashboard.
pub struct FileConfigStore {
    config: StoreConfig,
}

impl FileConfigStore {
    pub fn new(config: StoreConfig) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Option<ServerConfig> {
        let raw = fs::read_to_string(&self.config.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Ignoring unparseable server configuration: {}", e);
                None
            }
        }
    }

    fn save(&self, config: &ServerConfig) -> Result<(), TrackerError> {
        let raw = serde_json::to_string_pretty(config)?;
        fs::write(&self.config.path, raw)?;
        Ok(())
    }
}

/// In-process store for tests and embedders without durable storage.
#[derive(Default)]
pub struct MemoryConfigStore {
    record: RwLock<Option<ServerConfig>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start out with a record already present.
    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            record: RwLock::new(Some(config)),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Option<ServerConfig> {
        self.record
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn save(&self, config: &ServerConfig) -> Result<(), TrackerError> {
        *self.record.write().unwrap_or_else(|e| e.into_inner()) = Some(config.clone());
        Ok(())
    }
}
