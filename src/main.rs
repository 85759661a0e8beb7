//! Rolloff fleet tracking daemon

use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tracing::info;

use rolloff_tracker::client::TrackerClientBuilder;
use rolloff_tracker::config::AppConfig;
use rolloff_tracker::errors::TrackerError;
use rolloff_tracker::models::TrackingSnapshot;
use rolloff_tracker::poller::Poller;
use rolloff_tracker::store::FileConfigStore;

#[tokio::main]
async fn main() -> Result<(), TrackerError> {
    // Initialize logging, filtered through RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration, preferring environment variables and config files
    let config = AppConfig::load()?;
    config.tracker.validate()?;

    let store = Arc::new(FileConfigStore::new(config.store.clone())?);
    let client = Arc::new(
        TrackerClientBuilder::new(store)
            .fallback(config.tracker.fallback)
            .simulated_latency(config.tracker.simulated_latency)
            .build()?,
    );

    if client.is_configured() {
        info!("Tracking server configured, fetching live data");
    } else {
        info!("No tracking server configured, running in simulation mode");
    }

    let poller = Poller::start(client, config.tracker.poll_interval);
    let snapshots = poller.subscribe();

    // Setup signal handling for graceful shutdown
    let shutdown_signal = signal::ctrl_c();

    tokio::select! {
        _ = run_tracker(snapshots) => {
            info!("Snapshot stream ended");
        }
        _ = shutdown_signal => {
            info!("Received shutdown signal");
        }
    }

    poller.shutdown().await;

    Ok(())
}

/// Render each new snapshot to the log, standing in for the dashboard's
/// map and device list.
async fn run_tracker(mut snapshots: watch::Receiver<Option<TrackingSnapshot>>) {
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        if let Some(snapshot) = snapshot {
            render_snapshot(&snapshot);
        }
    }
}

fn render_snapshot(snapshot: &TrackingSnapshot) {
    info!(
        "Fleet snapshot: {} devices, {} moving",
        snapshot.devices.len(),
        snapshot.moving_count()
    );
    for position in &snapshot.positions {
        info!("{}", snapshot.position_summary(position));
    }
}
