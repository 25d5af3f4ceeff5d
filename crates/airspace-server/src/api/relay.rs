//! Telemetry relay endpoints.
//!
//! The drone reports its own position here and the aircraft feed is proxied
//! through, so a single base URL serves as the telemetry source.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::{AppState, RelayError};
use airspace_core::DroneReading;

fn number(body: &Value, key: &str) -> Option<f64> {
    body.get(key).and_then(Value::as_f64).filter(|v| v.is_finite())
}

/// Accept a drone self-report. All three fields must be numbers.
pub async fn drone_location(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let (Some(latitude), Some(longitude), Some(altitude)) = (
        number(&body, "latitude"),
        number(&body, "longitude"),
        number(&body, "altitude"),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid data format" })),
        );
    };

    state.relay().record(latitude, longitude, altitude);
    tracing::debug!(
        "Drone reported {:.5}, {:.5} at {:.0} m",
        latitude,
        longitude,
        altitude
    );
    (StatusCode::OK, Json(json!({ "status": "success" })))
}

/// Last self-reported drone position.
pub async fn drone_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DroneReading>, (StatusCode, Json<Value>)> {
    state.relay().last_fix().map(Json).ok_or((
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "No drone data available" })),
    ))
}

/// Upstream aircraft feed, passed through unchanged.
pub async fn aircraft_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.relay().fetch_feed().await {
        Ok(feed) => Ok(Json(feed)),
        Err(RelayError::NotConfigured) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "No aircraft feed configured" })),
        )),
        Err(e) => {
            tracing::error!("Aircraft feed unavailable: {}", e);
            Err((
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "Failed to fetch aircraft data" })),
            ))
        }
    }
}
