//! HTTP clients for the external collaborators.
//!
//! Both clients carry a request timeout so a stalled collaborator can never
//! hold a poll open past its cadence.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use airspace_core::models::{AircraftFeed, AircraftSighting, DroneReading, DroneState, LatLng};
use airspace_core::{parse_predictions, ParsedPredictions, WireError, ZoneSettings};

pub const AIRCRAFT_PATH: &str = "/data";
pub const DRONE_STATE_PATH: &str = "/drone_data";
pub const DRONE_LOCATION_PATH: &str = "/drone_location";
pub const CHECK_BREACH_PATH: &str = "/check_breach";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("malformed prediction response: {0}")]
    Wire(#[from] WireError),
    #[error("drone reading has no usable coordinates")]
    InvalidReading,
}

impl ClientError {
    /// True for a 404, which the telemetry source uses for "no drone fix yet".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::NOT_FOUND.as_u16())
    }
}

fn build_http(timeout: Duration) -> Result<Client, ClientError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

async fn read_json<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Client for the telemetry source (aircraft + drone state).
#[derive(Debug, Clone)]
pub struct TelemetryClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct DroneLocation {
    latitude: f64,
    longitude: f64,
    altitude: f64,
}

impl TelemetryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_http(timeout)?,
            base_url: base_url.into(),
        })
    }

    /// Current aircraft set, normalized to metric units.
    pub async fn fetch_aircraft(&self) -> Result<Vec<AircraftSighting>, ClientError> {
        let url = join_url(&self.base_url, AIRCRAFT_PATH);
        let response = self.client.get(&url).send().await?;
        let feed: AircraftFeed = read_json(&url, response).await?;
        Ok(feed.sightings())
    }

    /// Current drone fix. A reading without coordinates is an error.
    pub async fn fetch_drone(&self) -> Result<DroneState, ClientError> {
        let url = join_url(&self.base_url, DRONE_STATE_PATH);
        let response = self.client.get(&url).send().await?;
        let reading: DroneReading = read_json(&url, response).await?;
        DroneState::from_reading(&reading).ok_or(ClientError::InvalidReading)
    }

    /// Report a drone position to the self-report endpoint.
    pub async fn send_drone_location(
        &self,
        latitude: f64,
        longitude: f64,
        altitude: f64,
    ) -> Result<(), ClientError> {
        let url = join_url(&self.base_url, DRONE_LOCATION_PATH);
        let response = self
            .client
            .post(&url)
            .json(&DroneLocation {
                latitude,
                longitude,
                altitude,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                url,
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}

/// Client for the breach prediction service.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct CheckBreachRequest<'a> {
    settings: &'a ZoneSettings,
    #[serde(rename = "zoneData")]
    zone_data: LatLng,
}

impl PredictionClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_http(timeout)?,
            base_url: base_url.into(),
        })
    }

    /// Ask for breach predictions around `center` under `settings`.
    ///
    /// Predictions come back in service order. Individually malformed
    /// tuples are reported in `rejected` rather than failing the call.
    pub async fn check_breach(
        &self,
        settings: &ZoneSettings,
        center: LatLng,
    ) -> Result<ParsedPredictions, ClientError> {
        let url = join_url(&self.base_url, CHECK_BREACH_PATH);
        let response = self
            .client
            .post(&url)
            .json(&CheckBreachRequest {
                settings,
                zone_data: center,
            })
            .send()
            .await?;
        let body: serde_json::Value = read_json(&url, response).await?;
        let parsed = parse_predictions(&body)?;
        for rejected in &parsed.rejected {
            tracing::warn!("Dropped breach prediction: {}", rejected);
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airspace_core::BreachKind;
    use axum::{
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn timeout() -> Duration {
        Duration::from_secs(2)
    }

    #[tokio::test]
    async fn fetches_and_normalizes_aircraft() {
        let app = Router::new().route(
            AIRCRAFT_PATH,
            get(|| async {
                Json(json!({
                    "now": 1718000000.0,
                    "aircraft": [
                        {"hex": "4ca7b3", "lat": 48.7, "lon": 21.2, "alt_baro": 1000, "gs": 100},
                        {"hex": "nopos"}
                    ]
                }))
            }),
        );
        let client = TelemetryClient::new(serve(app).await, timeout()).unwrap();

        let aircraft = client.fetch_aircraft().await.unwrap();
        assert_eq!(aircraft.len(), 1);
        assert!((aircraft[0].altitude_m - 304.8).abs() < 1e-9);
        assert!((aircraft[0].speed_kmh - 185.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let app = Router::new().route(
            DRONE_STATE_PATH,
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({"error": "no fix"}))) }),
        );
        let client = TelemetryClient::new(serve(app).await, timeout()).unwrap();

        let err = client.fetch_drone().await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn drone_without_coordinates_is_invalid() {
        let app = Router::new().route(
            DRONE_STATE_PATH,
            get(|| async { Json(json!({"latitude": 48.72, "altitude": 90})) }),
        );
        let client = TelemetryClient::new(serve(app).await, timeout()).unwrap();

        let err = client.fetch_drone().await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidReading));
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let app = Router::new().route(AIRCRAFT_PATH, get(|| async { "<html>oops</html>" }));
        let client = TelemetryClient::new(serve(app).await, timeout()).unwrap();

        let err = client.fetch_aircraft().await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn stalled_source_times_out() {
        let app = Router::new().route(
            AIRCRAFT_PATH,
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"aircraft": []}))
            }),
        );
        let client =
            TelemetryClient::new(serve(app).await, Duration::from_millis(100)).unwrap();

        let err = client.fetch_aircraft().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[tokio::test]
    async fn check_breach_sends_settings_and_zone() {
        let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let captured = seen.clone();
        let app = Router::new().route(
            CHECK_BREACH_PATH,
            post(move |Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    *captured.lock().unwrap() = Some(body);
                    Json(json!([
                        ["4ca7b3", "Warning zone proximity", 2100.0, 40.0],
                        ["bad"],
                        ["abc123", "Flight zone breach", 50.0, 30.0]
                    ]))
                }
            }),
        );
        let client = PredictionClient::new(serve(app).await, timeout()).unwrap();

        let settings = ZoneSettings::default();
        let parsed = client
            .check_breach(&settings, LatLng::new(48.72, 21.26))
            .await
            .unwrap();

        assert_eq!(parsed.predictions.len(), 2);
        assert_eq!(parsed.rejected.len(), 1);
        assert_eq!(parsed.predictions[0].kind, BreachKind::WarningZoneBreach);

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["zoneData"], json!({"lat": 48.72, "lng": 21.26}));
        assert_eq!(body["settings"]["flightRange"], 25.0);
        assert_eq!(body["settings"]["duration"], 15.0);
    }

    #[tokio::test]
    async fn check_breach_null_body_is_empty() {
        let app = Router::new().route(CHECK_BREACH_PATH, post(|| async { Json(Value::Null) }));
        let client = PredictionClient::new(serve(app).await, timeout()).unwrap();

        let parsed = client
            .check_breach(&ZoneSettings::default(), LatLng::new(0.0, 0.0))
            .await
            .unwrap();
        assert!(parsed.predictions.is_empty());
    }

    #[tokio::test]
    async fn sends_drone_location() {
        let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let captured = seen.clone();
        let app = Router::new().route(
            DRONE_LOCATION_PATH,
            post(move |Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    *captured.lock().unwrap() = Some(body);
                    Json(json!({"status": "success"}))
                }
            }),
        );
        let client = TelemetryClient::new(serve(app).await, timeout()).unwrap();

        client.send_drone_location(48.72, 21.26, 120.0).await.unwrap();
        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body, json!({"latitude": 48.72, "longitude": 21.26, "altitude": 120.0}));
    }
}
