//! Background polling loops.

pub mod breach_loop;
pub mod telemetry_loop;

use std::sync::Arc;

use airspace_client::{ClientError, PredictionClient, TelemetryClient};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::state::AppState;

/// Spawn both loops against the collaborators named in the config.
pub fn spawn_all(
    state: Arc<AppState>,
    shutdown: &broadcast::Sender<()>,
) -> Result<Vec<JoinHandle<()>>, ClientError> {
    let config = state.config();
    let telemetry = TelemetryClient::new(config.telemetry_url.clone(), config.http_timeout)?;
    let prediction = PredictionClient::new(config.prediction_url.clone(), config.http_timeout)?;

    Ok(vec![
        tokio::spawn(telemetry_loop::run_telemetry_loop(
            state.clone(),
            telemetry,
            shutdown.subscribe(),
        )),
        tokio::spawn(breach_loop::run_breach_loop(
            state,
            prediction,
            shutdown.subscribe(),
        )),
    ])
}
