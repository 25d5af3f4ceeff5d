//! Operator settings, their bounds, and the fixed safety constants.

use serde::{Deserialize, Serialize};

/// Minimum altitude separation (meters) between the drone and a breaching
/// aircraft that is still considered safe.
pub const VERTICAL_SAFETY_MARGIN_M: f64 = 500.0;

/// Pad (meters) added to the center-to-drone distance when sizing the
/// flight zone.
pub const ZONE_SAFETY_PAD_M: f64 = 10.0;

/// Warning-zone meters added per unit of warning overhead.
pub const WARNING_OVERHEAD_SCALE_M: f64 = 2000.0;

/// Width (meters) of the altitude band over which threat colors blend.
pub const THREAT_BAND_M: f64 = 2000.0;

/// Inclusive numeric range with the step the operator controls move in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Bound {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Lower end of the range. A bound given with `min > max` is read as
    /// the same range with its ends swapped.
    pub fn lower(&self) -> f64 {
        self.min.min(self.max)
    }

    pub fn upper(&self) -> f64 {
        self.min.max(self.max)
    }

    /// Pull a value into range. NaN lands on the lower end.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.lower();
        }
        value.max(self.lower()).min(self.upper())
    }
}

/// Bounds for every operator-tunable zone setting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneBounds {
    /// Flight zone radius, meters
    pub flight_range: Bound,
    /// Warning buffer, kilometers
    pub warning_overhead: Bound,
    /// Zone altitude, meters
    pub altitude: Bound,
    /// Prediction horizon, minutes
    pub duration: Bound,
}

impl Default for ZoneBounds {
    fn default() -> Self {
        Self {
            flight_range: Bound::new(25.0, 5000.0, 25.0),
            warning_overhead: Bound::new(5.0, 20.0, 1.0),
            altitude: Bound::new(30.0, 2000.0, 10.0),
            duration: Bound::new(15.0, 120.0, 5.0),
        }
    }
}

/// Current zone settings. Serialized exactly as the prediction service
/// reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSettings {
    pub flight_range: f64,
    pub warning_overhead: f64,
    pub altitude: f64,
    pub duration: f64,
    #[serde(default = "default_true")]
    pub show_labels: bool,
    #[serde(default)]
    pub center_on_drone: bool,
}

fn default_true() -> bool {
    true
}

impl ZoneSettings {
    /// Starting settings: every numeric value at its lower bound.
    pub fn initial(bounds: &ZoneBounds) -> Self {
        Self {
            flight_range: bounds.flight_range.lower(),
            warning_overhead: bounds.warning_overhead.lower(),
            altitude: bounds.altitude.lower(),
            duration: bounds.duration.lower(),
            show_labels: true,
            center_on_drone: false,
        }
    }

    /// Apply an operator edit. Every provided number is clamped to its bound.
    pub fn apply(&mut self, update: &SettingsUpdate, bounds: &ZoneBounds) {
        if let Some(value) = update.flight_range {
            self.flight_range = bounds.flight_range.clamp(value);
        }
        if let Some(value) = update.warning_overhead {
            self.warning_overhead = bounds.warning_overhead.clamp(value);
        }
        if let Some(value) = update.altitude {
            self.altitude = bounds.altitude.clamp(value);
        }
        if let Some(value) = update.duration {
            self.duration = bounds.duration.clamp(value);
        }
        if let Some(value) = update.show_labels {
            self.show_labels = value;
        }
        if let Some(value) = update.center_on_drone {
            self.center_on_drone = value;
        }
    }

    /// Warning radius in meters for the current flight range.
    pub fn warning_radius_m(&self) -> f64 {
        warning_radius(self.flight_range, self.warning_overhead)
    }
}

impl Default for ZoneSettings {
    fn default() -> Self {
        Self::initial(&ZoneBounds::default())
    }
}

/// Partial settings edit from the operator; absent fields are untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub flight_range: Option<f64>,
    pub warning_overhead: Option<f64>,
    pub altitude: Option<f64>,
    pub duration: Option<f64>,
    pub show_labels: Option<bool>,
    pub center_on_drone: Option<bool>,
}

/// Warning radius for a flight radius (m) and overhead setting.
///
/// The overhead is never negative after clamping, so the result is never
/// smaller than `flight_radius_m`.
pub fn warning_radius(flight_radius_m: f64, warning_overhead: f64) -> f64 {
    flight_radius_m + warning_overhead.max(0.0) * WARNING_OVERHEAD_SCALE_M
}
