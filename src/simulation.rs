//! Fixed synthetic fleet served when no tracking server is usable.

use std::time::Duration;

use chrono::Utc;

use crate::models::{Device, DeviceCategory, DeviceStatus, Position};

/// Artificial delay applied before serving synthetic data, so the
/// unconfigured path behaves like a network round trip.
pub const SIMULATED_LATENCY: Duration = Duration::from_millis(500);

/// The demo fleet: two trucks and three rolloff containers.
pub fn devices() -> Vec<Device> {
    vec![
        device(1, "Truck-01 (Ford F550)", DeviceStatus::Online, DeviceCategory::Truck),
        device(2, "CNT-20-104 (20-yard)", DeviceStatus::Online, DeviceCategory::Container),
        device(3, "CNT-15-089 (15-yard)", DeviceStatus::Offline, DeviceCategory::Container),
        device(4, "Truck-02 (Mack)", DeviceStatus::Online, DeviceCategory::Truck),
        device(5, "CNT-10-005 (10-yard)", DeviceStatus::Online, DeviceCategory::Container),
    ]
}

/// One position per demo device, scattered around metropolitan Boston.
/// Device 4 is on the road; the rest sit still.
pub fn positions() -> Vec<Position> {
    vec![
        position(1, 42.3601, -71.0589, "123 Main St, Boston, MA", 0.0),
        position(2, 42.3736, -71.1097, "456 Oak Ave, Cambridge, MA", 12.0),
        position(3, 42.3876, -71.0995, "789 Pine Rd, Somerville, MA", 0.0),
        position(4, 42.3370, -71.2092, "321 Elm St, Newton, MA", 45.0),
        position(5, 42.2529, -71.0023, "654 Maple Ave, Quincy, MA", 0.0),
    ]
}

fn device(id: i64, name: &str, status: DeviceStatus, category: DeviceCategory) -> Device {
    Device {
        id,
        name: name.to_string(),
        status,
        category,
    }
}

fn position(device_id: i64, lat: f64, lon: f64, address: &str, speed: f64) -> Position {
    Position {
        device_id,
        lat,
        lon,
        address: Some(address.to_string()),
        speed,
        last_update: Utc::now(),
    }
}
