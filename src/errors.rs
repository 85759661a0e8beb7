//! Errors for the fleet tracker
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("HTTP request failed")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    #[error("Serialization error")]
    SerdeError(#[from] serde_json::Error),

    #[error("Configuration error")]
    ConfigError(#[from] config::ConfigError),

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("IO error")]
    IoError(#[from] std::io::Error),

    #[error("Tracking server not configured")]
    NotConfigured,
}

impl TrackerError {
    /// True for transport-level failures (connection, timeout), false for
    /// HTTP status and body-decoding problems.
    pub fn is_network(&self) -> bool {
        match self {
            TrackerError::HttpError(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}
