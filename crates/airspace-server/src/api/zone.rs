//! Zone and view endpoints driven by the operator.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;
use airspace_core::{LatLng, SettingsUpdate, ZoneBounds, ZoneGeometry, ZoneSettings};

/// Configured operator bounds.
pub async fn get_bounds(State(state): State<Arc<AppState>>) -> Json<ZoneBounds> {
    Json(state.get_bounds())
}

/// Explicitly place the zone center (map click).
pub async fn set_center(
    State(state): State<Arc<AppState>>,
    Json(center): Json<LatLng>,
) -> Result<Json<ZoneGeometry>, (StatusCode, Json<Value>)> {
    match state.set_zone_center(center) {
        Ok(zone) => {
            tracing::info!("Zone center set to {:.5}, {:.5}", center.lat, center.lng);
            Ok(Json(zone))
        }
        Err(e) => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string() })),
        )),
    }
}

#[derive(Debug, Serialize)]
pub struct RecenterResponse {
    /// False while waiting for the first drone fix
    pub applied: bool,
    pub zone: ZoneGeometry,
}

/// One-shot "set zone to drone".
pub async fn recenter(State(state): State<Arc<AppState>>) -> (StatusCode, Json<RecenterResponse>) {
    let applied = state.request_recenter();
    let response = RecenterResponse {
        applied,
        zone: state.get_zone(),
    };
    if applied {
        tracing::info!("Zone recentered on drone");
        (StatusCode::OK, Json(response))
    } else {
        tracing::info!("Recenter queued until the first drone fix");
        (StatusCode::ACCEPTED, Json(response))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeRequest {
    pub flight_range: f64,
}

/// Resize the flight zone.
pub async fn resize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResizeRequest>,
) -> Json<ZoneGeometry> {
    let zone = state.resize_zone(req.flight_range);
    tracing::info!("Flight zone resized to {:.0} m", zone.flight_radius_m);
    Json(zone)
}

/// Partial settings update; numeric values are clamped to their bounds.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> Json<ZoneSettings> {
    let settings = state.update_settings(&update);
    tracing::info!(
        "Settings updated: range={} overhead={} altitude={} duration={}",
        settings.flight_range,
        settings.warning_overhead,
        settings.altitude,
        settings.duration
    );
    Json(settings)
}

pub async fn toggle_center_on_drone(State(state): State<Arc<AppState>>) -> Json<Value> {
    let enabled = state.toggle_center_on_drone();
    Json(json!({ "centerOnDrone": enabled }))
}

pub async fn toggle_labels(State(state): State<Arc<AppState>>) -> Json<Value> {
    let enabled = state.toggle_labels();
    Json(json!({ "showLabels": enabled }))
}
