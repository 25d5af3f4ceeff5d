//! Airspace core: the pure state and derivations behind the drone
//! safety-zone monitor.

pub mod breach;
pub mod models;
pub mod proximity;
pub mod rules;
pub mod spatial;
pub mod threat;
pub mod zone;

pub use breach::{
    most_critical, parse_predictions, rank, BreachKind, BreachPrediction, BreachStatus,
    ParsedPredictions, StatusSeverity, WireError,
};
pub use models::{
    AircraftFeed, AircraftSighting, DroneReading, DroneState, LatLng, RawAircraft,
    TrackedAircraft, ViewSnapshot, ZoneGeometry,
};
pub use proximity::{active_warning, close_breaches, ProximityWarning};
pub use rules::{
    warning_radius, Bound, SettingsUpdate, ZoneBounds, ZoneSettings, VERTICAL_SAFETY_MARGIN_M,
};
pub use spatial::haversine_distance;
pub use threat::{threat_color, Rgb};
pub use zone::{ZoneError, ZoneTracker, ZoneUpdate};
