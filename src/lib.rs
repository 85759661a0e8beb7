//! Device-tracking data client for a rolloff fleet dashboard.
//!
//! Fetches devices and live positions from an optional Traccar-compatible
//! server, falling back to a fixed synthetic fleet so consumers always have
//! something to render.

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod poller;
pub mod simulation;
pub mod store;
