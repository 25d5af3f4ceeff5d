//! Breach predictions and their urgency ranking.
//!
//! Predictions come from the external prediction service as loose JSON
//! tuples. Ranking is a total order: every flight-zone breach precedes every
//! warning-zone breach, and within a kind the sooner breach comes first.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Which zone boundary a prediction crosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BreachKind {
    FlightZoneBreach,
    WarningZoneBreach,
}

impl BreachKind {
    /// Parse the kind strings the prediction service is known to send.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "FlightZoneBreach" | "Flight zone breach" => Some(Self::FlightZoneBreach),
            "WarningZoneBreach" | "Warning zone proximity" | "Warning zone breach" => {
                Some(Self::WarningZoneBreach)
            }
            _ => None,
        }
    }

    fn rank(self) -> u8 {
        match self {
            Self::FlightZoneBreach => 0,
            Self::WarningZoneBreach => 1,
        }
    }
}

impl fmt::Display for BreachKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FlightZoneBreach => f.write_str("Flight zone breach"),
            Self::WarningZoneBreach => f.write_str("Warning zone proximity"),
        }
    }
}

/// A predicted incursion of one aircraft into the flight or warning zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreachPrediction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aircraft_id: Option<String>,
    pub kind: BreachKind,
    /// Predicted aircraft altitude at breach, meters
    pub altitude_m: f64,
    pub time_to_breach_s: f64,
}

/// Reasons a prediction tuple is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireError {
    #[error("prediction response is not an array")]
    NotAnArray,
    #[error("prediction entry is not an array: {0}")]
    NotATuple(String),
    #[error("prediction tuple has {0} elements, expected 3 or 4")]
    TupleLength(usize),
    #[error("unknown breach kind {0:?}")]
    UnknownKind(String),
    #[error("prediction field `{0}` is not a finite number")]
    NotANumber(&'static str),
}

impl BreachPrediction {
    pub fn new(kind: BreachKind, altitude_m: f64, time_to_breach_s: f64) -> Self {
        Self {
            aircraft_id: None,
            kind,
            altitude_m,
            time_to_breach_s,
        }
    }

    pub fn with_aircraft(mut self, aircraft_id: impl Into<String>) -> Self {
        self.aircraft_id = Some(aircraft_id.into());
        self
    }

    /// Decode `[id, kind, altitude, seconds]` or `[kind, altitude, seconds]`.
    pub fn from_wire(value: &Value) -> Result<Self, WireError> {
        let items = value
            .as_array()
            .ok_or_else(|| WireError::NotATuple(value.to_string()))?;

        let (id, rest) = match items.len() {
            4 => (Some(&items[0]), &items[1..]),
            3 => (None, &items[..]),
            n => return Err(WireError::TupleLength(n)),
        };

        let kind_str = rest[0]
            .as_str()
            .ok_or_else(|| WireError::UnknownKind(rest[0].to_string()))?;
        let kind = BreachKind::parse(kind_str)
            .ok_or_else(|| WireError::UnknownKind(kind_str.to_string()))?;

        let altitude_m = finite(&rest[1]).ok_or(WireError::NotANumber("altitude"))?;
        let time_to_breach_s = finite(&rest[2]).ok_or(WireError::NotANumber("time_to_breach"))?;

        let aircraft_id = id.and_then(|id| match id {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        Ok(Self {
            aircraft_id,
            kind,
            altitude_m,
            time_to_breach_s,
        })
    }
}

fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

/// Result of decoding a prediction response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPredictions {
    /// Accepted predictions in the order the service sent them
    pub predictions: Vec<BreachPrediction>,
    /// Tuples that were dropped
    pub rejected: Vec<WireError>,
}

/// Decode a whole response body. `null` is an empty set; any other
/// non-array body is an error. Bad tuples are dropped individually.
pub fn parse_predictions(body: &Value) -> Result<ParsedPredictions, WireError> {
    let entries = match body {
        Value::Null => return Ok(ParsedPredictions::default()),
        Value::Array(entries) => entries,
        _ => return Err(WireError::NotAnArray),
    };

    let mut parsed = ParsedPredictions::default();
    for entry in entries {
        match BreachPrediction::from_wire(entry) {
            Ok(prediction) => parsed.predictions.push(prediction),
            Err(err) => parsed.rejected.push(err),
        }
    }
    Ok(parsed)
}

/// Urgency order: flight-zone before warning-zone, then ascending time.
pub fn urgency_cmp(a: &BreachPrediction, b: &BreachPrediction) -> Ordering {
    a.kind
        .rank()
        .cmp(&b.kind.rank())
        .then_with(|| a.time_to_breach_s.total_cmp(&b.time_to_breach_s))
}

/// Copy of `predictions` sorted by urgency (stable).
pub fn rank(predictions: &[BreachPrediction]) -> Vec<BreachPrediction> {
    let mut ranked = predictions.to_vec();
    ranked.sort_by(urgency_cmp);
    ranked
}

/// The single most urgent prediction, if any.
pub fn most_critical(predictions: &[BreachPrediction]) -> Option<&BreachPrediction> {
    predictions.iter().min_by(|a, b| urgency_cmp(a, b))
}

/// Severity of the dominant status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusSeverity {
    /// No predictions
    Clear,
    /// Most critical is a warning-zone breach
    Caution,
    /// Most critical is a flight-zone breach
    Critical,
}

impl StatusSeverity {
    pub fn color(self) -> &'static str {
        match self {
            Self::Clear => "green",
            Self::Caution => "yellow",
            Self::Critical => "red",
        }
    }
}

/// Status line shown to the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreachStatus {
    pub severity: StatusSeverity,
    pub color: String,
    pub message: String,
    pub breach: Option<BreachPrediction>,
}

impl BreachStatus {
    pub fn from_predictions(predictions: &[BreachPrediction]) -> Self {
        match most_critical(predictions) {
            None => Self::clear(),
            Some(breach) => {
                let severity = match breach.kind {
                    BreachKind::FlightZoneBreach => StatusSeverity::Critical,
                    BreachKind::WarningZoneBreach => StatusSeverity::Caution,
                };
                Self {
                    severity,
                    color: severity.color().to_string(),
                    message: format!(
                        "{} in {} seconds (altitude: {} m)",
                        breach.kind,
                        round_half_up(breach.time_to_breach_s),
                        round_half_up(breach.altitude_m)
                    ),
                    breach: Some(breach.clone()),
                }
            }
        }
    }

    pub fn clear() -> Self {
        Self {
            severity: StatusSeverity::Clear,
            color: StatusSeverity::Clear.color().to_string(),
            message: "No breach detected".to_string(),
            breach: None,
        }
    }
}

/// Round half toward positive infinity, for operator-facing integers.
pub(crate) fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
