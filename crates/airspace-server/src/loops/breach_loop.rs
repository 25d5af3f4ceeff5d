//! Loop asking the prediction service for breaches around the zone.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use airspace_client::PredictionClient;

use crate::state::AppState;

/// Start the breach loop. The first request goes out one period after start.
pub async fn run_breach_loop(
    state: Arc<AppState>,
    client: PredictionClient,
    mut shutdown: broadcast::Receiver<()>,
) {
    let period = state.config().breach_poll;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                in_flight.abort_all();
                tracing::info!("Breach loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                in_flight.spawn(poll_once(state.clone(), client.clone()));
            }
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
        }
    }
}

/// One breach cycle. Skipped until the zone has a center.
pub async fn poll_once(state: Arc<AppState>, client: PredictionClient) {
    let Some((settings, center)) = state.breach_request() else {
        tracing::debug!("Zone has no center yet, skipping breach check");
        return;
    };

    let ticket = state.begin_poll();
    match client.check_breach(&settings, center).await {
        Ok(parsed) => {
            let count = parsed.predictions.len();
            if state.replace_breaches(ticket, parsed.predictions) {
                tracing::debug!("Received {} breach predictions", count);
            }
        }
        Err(e) => {
            tracing::error!("Breach check failed: {}", e);
            state.replace_breaches(ticket, Vec::new());
        }
    }
}
