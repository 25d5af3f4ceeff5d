//! Server configuration from environment.

use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Base URL of the telemetry source (aircraft + drone state)
    pub telemetry_url: String,
    /// Base URL of the breach prediction service
    pub prediction_url: String,
    pub telemetry_poll: Duration,
    pub breach_poll: Duration,
    /// Upper bound on any single request to a collaborator
    pub http_timeout: Duration,
    /// Upstream `aircraft.json` proxied by the relay's `/data` route
    pub aircraft_feed_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 4100,
            telemetry_url: "http://localhost:4000".to_string(),
            prediction_url: "http://localhost:4000".to_string(),
            telemetry_poll: Duration::from_millis(3000),
            breach_poll: Duration::from_millis(5000),
            http_timeout: Duration::from_millis(2500),
            aircraft_feed_url: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let telemetry_url = env::var("TELEMETRY_URL").unwrap_or(defaults.telemetry_url);

        Self {
            server_port: env::var("AIRSPACE_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.server_port),
            prediction_url: env::var("PREDICTION_URL").unwrap_or_else(|_| telemetry_url.clone()),
            telemetry_url,
            telemetry_poll: env_millis("TELEMETRY_POLL_MS").unwrap_or(defaults.telemetry_poll),
            breach_poll: env_millis("BREACH_POLL_MS").unwrap_or(defaults.breach_poll),
            http_timeout: env_millis("HTTP_TIMEOUT_MS").unwrap_or(defaults.http_timeout),
            aircraft_feed_url: env::var("AIRCRAFT_FEED_URL")
                .ok()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
        }
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}
