//! Telemetry relay store: last self-reported drone fix plus the upstream
//! aircraft feed the `/data` route proxies.

use std::sync::RwLock;
use std::time::Duration;

use airspace_core::DroneReading;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("no aircraft feed configured")]
    NotConfigured,
    #[error("aircraft feed request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("aircraft feed returned HTTP {0}")]
    Status(u16),
}

pub struct RelayStore {
    last_fix: RwLock<Option<DroneReading>>,
    feed_url: Option<String>,
    http: Client,
}

impl RelayStore {
    pub fn new(feed_url: Option<String>, timeout: Duration) -> Self {
        Self {
            last_fix: RwLock::new(None),
            feed_url,
            http: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Record a self-reported position. Callers validate first.
    pub fn record(&self, latitude: f64, longitude: f64, altitude: f64) {
        let mut slot = self
            .last_fix
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(DroneReading {
            latitude: Some(latitude),
            longitude: Some(longitude),
            altitude: Some(altitude),
        });
    }

    pub fn last_fix(&self) -> Option<DroneReading> {
        self.last_fix
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Fetch the upstream aircraft feed verbatim.
    pub async fn fetch_feed(&self) -> Result<Value, RelayError> {
        let url = self.feed_url.as_deref().ok_or(RelayError::NotConfigured)?;
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(RelayError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_latest_fix() {
        let relay = RelayStore::new(None, Duration::from_secs(1));
        assert!(relay.last_fix().is_none());

        relay.record(48.72, 21.26, 90.0);
        relay.record(48.73, 21.27, 95.0);
        let fix = relay.last_fix().unwrap();
        assert_eq!(fix.latitude, Some(48.73));
        assert_eq!(fix.altitude, Some(95.0));
    }

    #[tokio::test]
    async fn unconfigured_feed_is_reported() {
        let relay = RelayStore::new(None, Duration::from_secs(1));
        assert!(matches!(
            relay.fetch_feed().await,
            Err(RelayError::NotConfigured)
        ));
    }
}
