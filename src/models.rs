//! Data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder label for positions whose device is missing from the snapshot.
pub const UNKNOWN_DEVICE: &str = "Unknown Device";

/// Connectivity status reported by the tracking server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
    /// Catch-all for status values outside the documented set.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Kind of trackable asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    /// Rolloff delivery truck.
    Truck,
    /// Rolloff container placed at a customer site.
    Container,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A trackable physical asset (truck or rolloff container).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    /// Display name, e.g. `Truck-01 (Ford F550)`.
    pub name: String,
    #[serde(default)]
    pub status: DeviceStatus,
    #[serde(default)]
    pub category: DeviceCategory,
}

/// Most recent location sample for one device.
///
/// The client only ever holds the latest sample per device; no position
/// history is retained on this side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Device this sample belongs to. May reference a device that is not
    /// present in the same snapshot.
    pub device_id: i64,
    /// Latitude in decimal degrees (WGS84).
    pub lat: f64,
    /// Longitude in decimal degrees (WGS84).
    pub lon: f64,
    /// Reverse-geocoded street address, when the server provides one.
    #[serde(default)]
    pub address: Option<String>,
    /// Speed over ground in km/h.
    #[serde(default)]
    pub speed: f64,
    /// Sample timestamp.
    pub last_update: DateTime<Utc>,
}

impl Position {
    /// Human-readable place label: the address when present, otherwise
    /// the coordinates to four decimal places.
    pub fn location_label(&self) -> String {
        match &self.address {
            Some(address) => address.clone(),
            None => format!("{:.4}, {:.4}", self.lat, self.lon),
        }
    }

    /// Whether the device is currently in motion.
    pub fn is_moving(&self) -> bool {
        self.speed > 0.0
    }
}

/// One poll cycle's devices and positions.
///
/// Snapshots are whole replacements: each cycle discards the previous one,
/// nothing is merged or diffed.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSnapshot {
    pub devices: Vec<Device>,
    pub positions: Vec<Position>,
    /// When the snapshot was assembled.
    pub taken_at: DateTime<Utc>,
}

impl TrackingSnapshot {
    /// Assemble a snapshot stamped with the current time.
    pub fn new(devices: Vec<Device>, positions: Vec<Position>) -> Self {
        Self {
            devices,
            positions,
            taken_at: Utc::now(),
        }
    }

    /// Look up a device by id.
    pub fn device_for(&self, device_id: i64) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == device_id)
    }

    /// Display name for a device id, tolerating positions whose device is
    /// missing from this snapshot.
    pub fn device_label(&self, device_id: i64) -> &str {
        self.device_for(device_id)
            .map(|d| d.name.as_str())
            .unwrap_or(UNKNOWN_DEVICE)
    }

    /// Number of positions reporting nonzero speed.
    pub fn moving_count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_moving()).count()
    }

    /// One log-ready line for a position: device name, category and
    /// status, movement, and place. Orphaned positions get unknown
    /// placeholders.
    pub fn position_summary(&self, position: &Position) -> String {
        let (name, category, status) = match self.device_for(position.device_id) {
            Some(device) => (device.name.as_str(), device.category, device.status),
            None => (UNKNOWN_DEVICE, DeviceCategory::Unknown, DeviceStatus::Unknown),
        };
        let movement = if position.is_moving() {
            format!(
                "moving at {} km/h near {}",
                position.speed,
                position.location_label()
            )
        } else {
            format!("parked at {}", position.location_label())
        };
        format!("{} [{:?}/{:?}]: {}", name, category, status, movement)
    }
}
