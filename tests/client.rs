//! Integration tests exercising the client against a throwaway HTTP server.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use rolloff_tracker::client::{FallbackPolicy, TrackerClient, TrackerClientBuilder};
use rolloff_tracker::errors::TrackerError;
use rolloff_tracker::models::{Device, DeviceCategory, DeviceStatus};
use rolloff_tracker::poller::Poller;
use rolloff_tracker::store::{MemoryConfigStore, ServerConfig};

const TEST_LATENCY: Duration = Duration::from_millis(5);

/// Serve `app` on an ephemeral port, returning its base URL.
async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A URL on which nothing listens, so connections are refused.
async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn client_for(url: &str, policy: FallbackPolicy) -> TrackerClient {
    let store = Arc::new(MemoryConfigStore::with_config(ServerConfig {
        url: url.to_string(),
        username: "admin".to_string(),
        password: "secret".to_string(),
    }));
    TrackerClientBuilder::new(store)
        .fallback(policy)
        .simulated_latency(TEST_LATENCY)
        .build()
        .unwrap()
}

fn remote_devices_body() -> Value {
    json!([{"id": 9, "name": "X", "status": "online", "category": "truck"}])
}

fn happy_router() -> Router {
    Router::new()
        .route("/api/devices", get(|| async { Json(remote_devices_body()) }))
        .route(
            "/api/positions",
            get(|| async {
                Json(json!([{
                    "deviceId": 9,
                    "lat": 42.35,
                    "lon": -71.06,
                    "address": "1 Depot Way, Boston, MA",
                    "speed": 18.5,
                    "lastUpdate": "2025-06-14T09:30:00Z"
                }]))
            }),
        )
}

fn failing_router() -> Router {
    Router::new()
        .route(
            "/api/devices",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route(
            "/api/positions",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
}

fn guarded_router() -> Router {
    Router::new().route(
        "/api/devices",
        get(|headers: HeaderMap| async move {
            match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                Some("Basic YWRtaW46c2VjcmV0") => Ok(Json(remote_devices_body())),
                _ => Err(StatusCode::UNAUTHORIZED),
            }
        }),
    )
}

#[tokio::test]
async fn remote_devices_pass_through_unmodified() {
    let url = serve(happy_router()).await;
    let client = client_for(&url, FallbackPolicy::Never);

    let devices = client.devices().await.unwrap();

    assert_eq!(
        devices,
        vec![Device {
            id: 9,
            name: "X".to_string(),
            status: DeviceStatus::Online,
            category: DeviceCategory::Truck,
        }]
    );
    assert_eq!(
        serde_json::to_value(&devices).unwrap(),
        remote_devices_body()
    );
}

#[tokio::test]
async fn remote_positions_parse() {
    let url = serve(happy_router()).await;
    let client = client_for(&url, FallbackPolicy::Never);

    let positions = client.positions().await.unwrap();

    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].device_id, 9);
    assert_eq!(positions[0].speed, 18.5);
    assert!(positions[0].is_moving());
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_tolerated() {
    let url = serve(happy_router()).await;
    let client = client_for(&format!("{}/", url), FallbackPolicy::Never);

    let devices = client.devices().await.unwrap();

    assert_eq!(devices.len(), 1);
}

#[tokio::test]
async fn basic_credentials_reach_the_wire() {
    let url = serve(guarded_router()).await;
    let client = client_for(&url, FallbackPolicy::Never);

    let devices = client.devices().await.unwrap();

    assert_eq!(devices.len(), 1);
}

#[tokio::test]
async fn wrong_credentials_surface_as_status_error() {
    let url = serve(guarded_router()).await;
    let store = Arc::new(MemoryConfigStore::with_config(ServerConfig {
        url,
        username: "admin".to_string(),
        password: "wrong".to_string(),
    }));
    let client = TrackerClientBuilder::new(store)
        .fallback(FallbackPolicy::Never)
        .build()
        .unwrap();

    let result = client.devices().await;

    assert!(matches!(
        result,
        Err(TrackerError::UnexpectedStatus { status: 401 })
    ));
}

#[tokio::test]
async fn server_error_degrades_to_synthetic_data() {
    let url = serve(failing_router()).await;
    let client = client_for(&url, FallbackPolicy::Always);

    let devices = client.devices().await.unwrap();
    let positions = client.positions().await.unwrap();

    let ids: Vec<i64> = devices.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(positions.len(), 5);
    assert_eq!(positions[3].speed, 45.0);
}

#[tokio::test]
async fn server_error_propagates_under_never() {
    let url = serve(failing_router()).await;
    let client = client_for(&url, FallbackPolicy::Never);

    let result = client.devices().await;

    assert!(matches!(
        result,
        Err(TrackerError::UnexpectedStatus { status: 500 })
    ));
}

#[tokio::test]
async fn server_error_propagates_under_on_network_error() {
    let url = serve(failing_router()).await;
    let client = client_for(&url, FallbackPolicy::OnNetworkError);

    let result = client.devices().await;

    assert!(matches!(
        result,
        Err(TrackerError::UnexpectedStatus { status: 500 })
    ));
}

#[tokio::test]
async fn refused_connection_degrades_to_synthetic_data() {
    let url = refused_url().await;
    let client = client_for(&url, FallbackPolicy::Always);

    let devices = client.devices().await.unwrap();
    let positions = client.positions().await.unwrap();

    assert_eq!(devices.len(), 5);
    assert_eq!(positions.len(), 5);
}

#[tokio::test]
async fn refused_connection_counts_as_network_error() {
    let url = refused_url().await;

    let lenient = client_for(&url, FallbackPolicy::OnNetworkError);
    assert_eq!(lenient.devices().await.unwrap().len(), 5);

    let strict = client_for(&url, FallbackPolicy::Never);
    let result = strict.devices().await;
    assert!(matches!(result, Err(TrackerError::HttpError(_))));
}

#[tokio::test]
async fn malformed_body_degrades_only_under_always() {
    let app = Router::new().route("/api/devices", get(|| async { "not json" }));
    let url = serve(app).await;

    let lenient = client_for(&url, FallbackPolicy::Always);
    assert_eq!(lenient.devices().await.unwrap().len(), 5);

    let strict = client_for(&url, FallbackPolicy::OnNetworkError);
    assert!(strict.devices().await.is_err());
}

#[tokio::test]
async fn poller_publishes_remote_snapshots_until_shutdown() {
    let url = serve(happy_router()).await;
    let client = Arc::new(client_for(&url, FallbackPolicy::Never));

    let poller = Poller::start(client, Duration::from_secs(60));
    let mut rx = poller.subscribe();

    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.is_some()))
        .await
        .unwrap()
        .unwrap();

    let snapshot = rx.borrow().clone().unwrap();
    assert_eq!(snapshot.device_label(9), "X");
    assert_eq!(snapshot.device_label(1234), "Unknown Device");

    poller.shutdown().await;

    tokio::time::timeout(Duration::from_secs(5), async {
        while rx.changed().await.is_ok() {}
    })
    .await
    .unwrap();
}
