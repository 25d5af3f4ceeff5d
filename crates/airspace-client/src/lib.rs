//! Airspace client - HTTP access to the telemetry source and the breach
//! prediction service.

pub mod client;

pub use client::{ClientError, PredictionClient, TelemetryClient};
