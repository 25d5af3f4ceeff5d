//! REST API routes.

use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;

use crate::api::{relay, ws, zone};
use crate::state::AppState;
use airspace_core::ViewSnapshot;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    let view_routes = Router::new()
        .route("/v1/snapshot", get(get_snapshot))
        .route("/v1/stream", get(ws::ws_handler))
        .route("/v1/zone/bounds", get(zone::get_bounds))
        .route("/v1/zone/center", post(zone::set_center))
        .route("/v1/zone/recenter", post(zone::recenter))
        .route("/v1/zone/resize", post(zone::resize))
        .route("/v1/zone/settings", put(zone::update_settings))
        .route("/v1/view/center-on-drone", post(zone::toggle_center_on_drone))
        .route("/v1/view/labels", post(zone::toggle_labels));

    let relay_routes = Router::new()
        .route("/drone_location", post(relay::drone_location))
        .route("/drone_data", get(relay::drone_data))
        .route("/data", get(relay::aircraft_data));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(view_routes)
        .merge(relay_routes)
}

async fn get_snapshot(State(state): State<Arc<AppState>>) -> Json<ViewSnapshot> {
    Json(state.snapshot())
}
