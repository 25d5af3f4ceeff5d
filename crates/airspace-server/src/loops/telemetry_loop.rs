//! Loop polling the telemetry source for aircraft and drone state.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};

use airspace_client::{ClientError, TelemetryClient};

use crate::state::AppState;

/// Start the telemetry loop. The first poll fires immediately.
pub async fn run_telemetry_loop(
    state: Arc<AppState>,
    client: TelemetryClient,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval(state.config().telemetry_poll);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                in_flight.abort_all();
                tracing::info!("Telemetry loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                // A slow poll may overlap the next one; the ticket decides
                // which response wins.
                in_flight.spawn(poll_once(state.clone(), client.clone()));
            }
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
        }
    }
}

/// One telemetry cycle: aircraft and drone fetched concurrently.
pub async fn poll_once(state: Arc<AppState>, client: TelemetryClient) {
    let aircraft_ticket = state.begin_poll();
    let drone_ticket = state.begin_poll();
    let (aircraft, drone) = tokio::join!(client.fetch_aircraft(), client.fetch_drone());

    match aircraft {
        Ok(aircraft) => {
            let count = aircraft.len();
            if state.replace_aircraft(aircraft_ticket, aircraft) {
                tracing::debug!("Tracking {} aircraft", count);
            }
        }
        Err(e) => {
            tracing::warn!("Aircraft fetch failed: {}", e);
            state.replace_aircraft(aircraft_ticket, Vec::new());
        }
    }

    match drone {
        Ok(drone) => {
            if let Some(update) = state.update_drone(drone_ticket, drone) {
                if update.center_set {
                    tracing::info!("Zone centered on first drone fix");
                }
                if update.recentered {
                    tracing::info!("Zone recentered on drone");
                }
                if let Some(range) = update.flight_range_m {
                    tracing::info!("Flight zone grown to {:.0} m", range);
                }
                if let Some(altitude) = update.altitude_m {
                    tracing::info!("Altitude threshold raised to {:.0} m", altitude);
                }
            }
        }
        // Last valid fix is retained in every failure case.
        Err(ClientError::InvalidReading) => {
            tracing::debug!("Ignoring drone reading without coordinates");
        }
        Err(e) if e.is_not_found() => {
            tracing::debug!("No drone fix available yet");
        }
        Err(e) => {
            tracing::warn!("Drone fetch failed: {}", e);
        }
    }
}
