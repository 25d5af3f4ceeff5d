use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::{api, config::Config, state::AppState};
use airspace_core::{BreachKind, BreachPrediction, DroneState};

fn setup_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::default()));
    let app = api::routes().with_state(state.clone());
    (app, state)
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let (app, _state) = setup_app();
    let res = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn empty_aircraft_fetch_shows_zero_aircraft() {
    let (app, state) = setup_app();
    let ticket = state.begin_poll();
    state.replace_aircraft(ticket, Vec::new());

    let res = app.oneshot(get("/v1/snapshot")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["aircraft"], json!([]));
    assert_eq!(body["status"]["severity"], "clear");
    assert_eq!(body["status"]["message"], "No breach detected");
    assert!(body["proximity_warning"].is_null());
}

#[tokio::test]
async fn proximity_warning_within_margin() {
    let (app, state) = setup_app();
    let ticket = state.begin_poll();
    state.update_drone(ticket, DroneState::new(48.72, 21.26, 1800.0));
    let ticket = state.begin_poll();
    state.replace_breaches(
        ticket,
        vec![BreachPrediction::new(BreachKind::WarningZoneBreach, 2100.0, 40.0)],
    );

    let body = read_json(app.clone().oneshot(get("/v1/snapshot")).await.unwrap()).await;
    assert_eq!(body["proximity_warning"]["altitude_gap_m"], 300.0);

    let ticket = state.begin_poll();
    state.replace_breaches(
        ticket,
        vec![BreachPrediction::new(BreachKind::WarningZoneBreach, 2400.0, 40.0)],
    );
    let body = read_json(app.oneshot(get("/v1/snapshot")).await.unwrap()).await;
    assert!(body["proximity_warning"].is_null());
}

#[tokio::test]
async fn flight_zone_breach_dominates_status() {
    let (app, state) = setup_app();
    let ticket = state.begin_poll();
    state.replace_breaches(
        ticket,
        vec![
            BreachPrediction::new(BreachKind::FlightZoneBreach, 50.0, 30.0),
            BreachPrediction::new(BreachKind::WarningZoneBreach, 10.0, 5.0),
        ],
    );

    let body = read_json(app.oneshot(get("/v1/snapshot")).await.unwrap()).await;
    assert_eq!(body["status"]["severity"], "critical");
    assert_eq!(body["status"]["color"], "red");
    assert_eq!(body["status"]["breach"]["kind"], "FlightZoneBreach");
    assert_eq!(body["breaches"][0]["kind"], "FlightZoneBreach");
    assert_eq!(body["breaches"][1]["kind"], "WarningZoneBreach");
}

#[tokio::test]
async fn recenter_moves_zone_to_drone() {
    let (app, state) = setup_app();
    let res = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/v1/zone/center",
            json!({"lat": 48.0, "lng": 21.0}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let ticket = state.begin_poll();
    state.update_drone(ticket, DroneState::new(48.72, 21.26, 40.0));

    let res = app.clone().oneshot(empty_post("/v1/zone/recenter")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(read_json(res).await["applied"], true);

    let body = read_json(app.oneshot(get("/v1/snapshot")).await.unwrap()).await;
    assert_eq!(body["zone"]["center"], json!({"lat": 48.72, "lng": 21.26}));
    assert_eq!(body["recenter_pending"], false);
}

#[tokio::test]
async fn recenter_without_drone_is_queued() {
    let (app, state) = setup_app();
    let res = app.oneshot(empty_post("/v1/zone/recenter")).await.unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let body = read_json(res).await;
    assert_eq!(body["applied"], false);
    assert!(body["zone"]["center"].is_null());
    assert!(state.snapshot().recenter_pending);
}

#[tokio::test]
async fn invalid_center_is_rejected() {
    let (app, state) = setup_app();
    let res = app
        .oneshot(send_json(
            "POST",
            "/v1/zone/center",
            json!({"lat": 123.0, "lng": 21.0}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(state.get_zone().center.is_none());
}

#[tokio::test]
async fn settings_are_clamped() {
    let (app, _state) = setup_app();
    let res = app
        .clone()
        .oneshot(send_json(
            "PUT",
            "/v1/zone/settings",
            json!({"flightRange": 99999.0, "duration": 1.0, "warningOverhead": 7.0}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["flightRange"], 5000.0);
    assert_eq!(body["duration"], 15.0);
    assert_eq!(body["warningOverhead"], 7.0);

    let bounds = read_json(app.oneshot(get("/v1/zone/bounds")).await.unwrap()).await;
    assert_eq!(bounds["flightRange"]["max"], 5000.0);
}

#[tokio::test]
async fn resize_sets_flight_radius() {
    let (app, _state) = setup_app();
    let res = app
        .clone()
        .oneshot(send_json("POST", "/v1/zone/resize", json!({"flightRange": 400.0})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["flight_radius_m"], 400.0);
    assert_eq!(body["warning_radius_m"], 10400.0);

    let res = app
        .oneshot(send_json("POST", "/v1/zone/resize", json!({"flightRange": 1.0e9})))
        .await
        .unwrap();
    assert_eq!(read_json(res).await["flight_radius_m"], 5000.0);
}

#[tokio::test]
async fn view_flags_toggle() {
    let (app, state) = setup_app();
    let res = app.clone().oneshot(empty_post("/v1/view/labels")).await.unwrap();
    assert_eq!(read_json(res).await["showLabels"], false);

    let res = app
        .oneshot(empty_post("/v1/view/center-on-drone"))
        .await
        .unwrap();
    assert_eq!(read_json(res).await["centerOnDrone"], true);

    let settings = state.get_settings();
    assert!(!settings.show_labels);
    assert!(settings.center_on_drone);
}

#[tokio::test]
async fn relay_stores_drone_location() {
    let (app, _state) = setup_app();
    let res = app.clone().oneshot(get("/drone_data")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/drone_location",
            json!({"latitude": 48.72, "longitude": 21.26, "altitude": 120.0}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = read_json(app.oneshot(get("/drone_data")).await.unwrap()).await;
    assert_eq!(body["latitude"], 48.72);
    assert_eq!(body["altitude"], 120.0);
}

#[tokio::test]
async fn relay_rejects_non_numeric_location() {
    let (app, _state) = setup_app();
    let res = app
        .oneshot(send_json(
            "POST",
            "/drone_location",
            json!({"latitude": "48.72", "longitude": 21.26, "altitude": 120.0}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn aircraft_proxy_without_feed_is_unavailable() {
    let (app, _state) = setup_app();
    let res = app.oneshot(get("/data")).await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}
