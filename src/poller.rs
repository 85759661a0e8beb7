//! Repeating fetch task with an explicit start/stop lifecycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::client::TrackerClient;
use crate::errors::TrackerError;
use crate::models::TrackingSnapshot;

/// Polls the tracking client on a fixed interval and publishes whole
/// snapshots on a watch channel.
///
/// Subscribers always observe the latest snapshot; a result from a slow
/// tick can never land on top of a newer one. Dropping the poller cancels
/// the task, so no timer outlives its consumer.
pub struct Poller {
    cancel: CancellationToken,
    rx: watch::Receiver<Option<TrackingSnapshot>>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Spawn the polling task. The first fetch fires immediately, then
    /// once per `interval`.
    pub fn start(client: Arc<TrackerClient>, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(None);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(Self::run(client, interval, tx, cancel.clone()));

        Self {
            cancel,
            rx,
            handle: Some(handle),
        }
    }

    /// Current-snapshot receiver. Holds `None` until the first fetch
    /// completes.
    pub fn subscribe(&self) -> watch::Receiver<Option<TrackingSnapshot>> {
        self.rx.clone()
    }

    /// Cancel the polling task without waiting for it to wind down. A
    /// fetch already in flight is abandoned, not published.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Cancel the polling task and wait for it to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!("Polling task failed: {}", e);
            }
        }
    }

    async fn run(
        client: Arc<TrackerClient>,
        interval: Duration,
        tx: watch::Sender<Option<TrackingSnapshot>>,
        cancel: CancellationToken,
    ) {
        info!("Polling tracking data every {:?}", interval);
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            // A fetch still in flight when the token is cancelled is
            // abandoned, never published.
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = Self::poll(&client) => match result {
                    Ok(snapshot) => {
                        // Send fails only when every receiver is gone.
                        let _ = tx.send(Some(snapshot));
                    }
                    Err(e) => error!("Poll cycle failed: {}", e),
                }
            }
        }

        info!("Polling stopped");
    }

    async fn poll(client: &TrackerClient) -> Result<TrackingSnapshot, TrackerError> {
        let (devices, positions) = tokio::join!(client.devices(), client.positions());
        Ok(TrackingSnapshot::new(devices?, positions?))
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
