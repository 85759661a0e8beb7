//! HTTP client for a Traccar-compatible tracking server, with synthetic
//! fallback so a dashboard always has something to render.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::TrackerError;
use crate::models::{Device, Position};
use crate::simulation;
use crate::store::{ConfigStore, ServerConfig};

/// What to serve when the remote fetch is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Serve synthetic data for every failure class, and when no server is
    /// configured. The caller never sees an error.
    #[default]
    Always,
    /// Propagate every failure; an unconfigured server is an error too.
    Never,
    /// Serve synthetic data only for transport-level failures (connect,
    /// timeout); anything the server itself answered propagates.
    OnNetworkError,
}

/// Client for the device and position endpoints.
///
/// Every call re-reads the injected [`ConfigStore`], so a configuration
/// saved mid-run takes effect on the next fetch without a restart.
pub struct TrackerClient {
    http: Client,
    store: Arc<dyn ConfigStore>,
    fallback: FallbackPolicy,
    simulated_latency: Duration,
}

impl TrackerClient {
    /// Current device list: remote when a server is usable, synthetic
    /// otherwise.
    pub async fn devices(&self) -> Result<Vec<Device>, TrackerError> {
        self.fetch("devices", simulation::devices).await
    }

    /// Latest position per device: remote when a server is usable,
    /// synthetic otherwise.
    pub async fn positions(&self) -> Result<Vec<Position>, TrackerError> {
        self.fetch("positions", simulation::positions).await
    }

    /// Whether a server record with a non-empty URL is currently stored.
    ///
    /// Fetch results do not carry a real-versus-synthetic marker; this
    /// separate check is the only way a consumer can tell the two apart.
    pub fn is_configured(&self) -> bool {
        self.store
            .load()
            .map(|c| c.is_configured())
            .unwrap_or(false)
    }

    async fn fetch<T>(
        &self,
        endpoint: &str,
        simulate: fn() -> Vec<T>,
    ) -> Result<Vec<T>, TrackerError>
    where
        T: DeserializeOwned,
    {
        let server = match self.store.load().filter(ServerConfig::is_configured) {
            Some(server) => server,
            None => {
                if self.fallback == FallbackPolicy::Never {
                    return Err(TrackerError::NotConfigured);
                }
                debug!("No tracking server configured, serving synthetic {}", endpoint);
                tokio::time::sleep(self.simulated_latency).await;
                return Ok(simulate());
            }
        };

        match self.fetch_remote(&server, endpoint).await {
            Ok(items) => Ok(items),
            Err(e) => {
                warn!("Fetching {} from {} failed: {}", endpoint, server.url, e);
                match self.fallback {
                    FallbackPolicy::Always => Ok(simulate()),
                    FallbackPolicy::OnNetworkError if e.is_network() => Ok(simulate()),
                    _ => Err(e),
                }
            }
        }
    }

    async fn fetch_remote<T>(
        &self,
        server: &ServerConfig,
        endpoint: &str,
    ) -> Result<Vec<T>, TrackerError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/api/{}", server.url.trim_end_matches('/'), endpoint);
        let response = self
            .http
            .get(&url)
            .basic_auth(&server.username, Some(&server.password))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

/// Builder for TrackerClient with simplified configuration
pub struct TrackerClientBuilder {
    store: Arc<dyn ConfigStore>,
    fallback: Option<FallbackPolicy>,
    simulated_latency: Option<Duration>,
}

impl TrackerClientBuilder {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            fallback: None,
            simulated_latency: None,
        }
    }

    pub fn fallback(mut self, policy: FallbackPolicy) -> Self {
        self.fallback = Some(policy);
        self
    }

    pub fn simulated_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = Some(latency);
        self
    }

    pub fn build(self) -> Result<TrackerClient, TrackerError> {
        let http = Client::builder().build()?;

        Ok(TrackerClient {
            http,
            store: self.store,
            fallback: self.fallback.unwrap_or_default(),
            simulated_latency: self
                .simulated_latency
                .unwrap_or(simulation::SIMULATED_LATENCY),
        })
    }
}
