//! Core data models for the airspace monitor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::breach::{rank, BreachPrediction, BreachStatus};
use crate::proximity::{active_warning, ProximityWarning};
use crate::rules::{ZoneBounds, ZoneSettings};
use crate::threat::threat_color;
use crate::zone::ZoneTracker;

const FEET_TO_METERS: f64 = 0.3048;
const KNOTS_TO_KMH: f64 = 1.852;

/// A geodetic point, named the way the map layer names it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// One record of the receiver's `aircraft.json`, as sent by the source.
///
/// Every numeric field is optional and tolerated in any JSON type; a value
/// that is not a number (e.g. `"alt_baro": "ground"`) reads as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAircraft {
    #[serde(default)]
    pub hex: Option<String>,
    #[serde(default)]
    pub flight: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub lon: Option<f64>,
    /// Geometric altitude, feet
    #[serde(default, deserialize_with = "lenient_number")]
    pub alt_geom: Option<f64>,
    /// Barometric altitude, feet
    #[serde(default, deserialize_with = "lenient_number")]
    pub alt_baro: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub track: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub nav_heading: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub mag_heading: Option<f64>,
    /// Ground speed, knots
    #[serde(default, deserialize_with = "lenient_number")]
    pub gs: Option<f64>,
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|value| value.as_f64())
        .filter(|value| value.is_finite()))
}

/// Body of the aircraft-state endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AircraftFeed {
    #[serde(default)]
    pub aircraft: Vec<RawAircraft>,
}

impl AircraftFeed {
    /// Normalized sightings; records without a position are skipped.
    pub fn sightings(&self) -> Vec<AircraftSighting> {
        self.aircraft
            .iter()
            .filter_map(AircraftSighting::from_raw)
            .collect()
    }
}

/// A tracked aircraft in metric units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftSighting {
    /// ICAO hex address reported by the source
    pub hex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
    pub heading_deg: f64,
    pub speed_kmh: f64,
}

impl AircraftSighting {
    /// Normalize a raw record. Returns `None` when latitude or longitude is missing.
    pub fn from_raw(raw: &RawAircraft) -> Option<Self> {
        let lat = raw.lat?;
        let lon = raw.lon?;

        let altitude_ft = raw.alt_geom.or(raw.alt_baro).unwrap_or(0.0);
        let heading_deg = raw
            .track
            .or(raw.nav_heading)
            .or(raw.mag_heading)
            .unwrap_or(0.0);
        let speed_kn = raw.gs.unwrap_or(0.0);

        Some(Self {
            hex: raw.hex.as_deref().unwrap_or_default().trim().to_string(),
            callsign: raw
                .flight
                .as_deref()
                .map(str::trim)
                .filter(|callsign| !callsign.is_empty())
                .map(str::to_string),
            lat,
            lon,
            altitude_m: altitude_ft * FEET_TO_METERS,
            heading_deg,
            speed_kmh: speed_kn * KNOTS_TO_KMH,
        })
    }
}

/// Drone position as reported by the drone-state endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DroneReading {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
}

/// Last valid drone fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneState {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters
    pub altitude: f64,
    pub received_at: DateTime<Utc>,
}

impl DroneState {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
            received_at: Utc::now(),
        }
    }

    /// Validate a reading. Missing or non-finite coordinates reject the
    /// whole reading; a missing altitude reads as 0.
    pub fn from_reading(reading: &DroneReading) -> Option<Self> {
        let position = LatLng::new(reading.latitude?, reading.longitude?);
        if !position.is_valid() {
            return None;
        }
        let altitude = reading.altitude.filter(|alt| alt.is_finite()).unwrap_or(0.0);
        Some(Self::new(position.lat, position.lng, altitude))
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// Safety-zone geometry around the zone center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneGeometry {
    /// `None` until an operator click or the first drone fix sets it
    pub center: Option<LatLng>,
    pub flight_radius_m: f64,
    pub warning_radius_m: f64,
}

/// Aircraft annotated with its altitude threat color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedAircraft {
    #[serde(flatten)]
    pub sighting: AircraftSighting,
    /// `#rrggbb`
    pub color: String,
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub aircraft: Vec<TrackedAircraft>,
    pub drone: Option<DroneState>,
    pub zone: ZoneGeometry,
    pub settings: ZoneSettings,
    pub bounds: ZoneBounds,
    /// Ranked most-critical first
    pub breaches: Vec<BreachPrediction>,
    pub status: BreachStatus,
    pub proximity_warning: Option<ProximityWarning>,
    /// A "set zone to drone" request is waiting for a drone fix
    pub recenter_pending: bool,
    pub updated_at: DateTime<Utc>,
}

impl ViewSnapshot {
    /// Derive the full view from committed state.
    ///
    /// `breaches` must be in service order: the proximity warning is taken
    /// from that order, while the published list is ranked by urgency.
    pub fn derive(
        aircraft: &[AircraftSighting],
        drone: Option<&DroneState>,
        zone: &ZoneTracker,
        breaches: &[BreachPrediction],
    ) -> Self {
        let settings = zone.settings().clone();
        let aircraft = aircraft
            .iter()
            .map(|sighting| TrackedAircraft {
                color: threat_color(sighting.altitude_m, settings.altitude).to_string(),
                sighting: sighting.clone(),
            })
            .collect();

        Self {
            aircraft,
            drone: drone.cloned(),
            zone: zone.geometry(),
            bounds: *zone.bounds(),
            breaches: rank(breaches),
            status: BreachStatus::from_predictions(breaches),
            proximity_warning: drone.and_then(|drone| active_warning(breaches, drone.altitude)),
            recenter_pending: zone.recenter_pending(),
            settings,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_feed(json: &str) -> Vec<AircraftSighting> {
        serde_json::from_str::<AircraftFeed>(json).unwrap().sightings()
    }

    #[test]
    fn test_sighting_prefers_geometric_altitude() {
        let sightings = parse_feed(
            r#"{"aircraft":[{"hex":"4ca7b3","lat":48.7,"lon":21.2,"alt_geom":10000,"alt_baro":9000,"gs":400,"track":90}]}"#,
        );
        assert_eq!(sightings.len(), 1);
        let ac = &sightings[0];
        assert_eq!(ac.hex, "4ca7b3");
        assert!((ac.altitude_m - 3048.0).abs() < 1e-9);
        assert!((ac.speed_kmh - 740.8).abs() < 1e-9);
        assert_eq!(ac.heading_deg, 90.0);
    }

    #[test]
    fn test_ground_barometric_altitude_defaults_to_zero() {
        let sightings = parse_feed(
            r#"{"aircraft":[{"hex":"abc","lat":48.7,"lon":21.2,"alt_baro":"ground","nav_heading":12.5}]}"#,
        );
        assert_eq!(sightings[0].altitude_m, 0.0);
        assert_eq!(sightings[0].heading_deg, 12.5);
        assert_eq!(sightings[0].speed_kmh, 0.0);
    }

    #[test]
    fn test_heading_falls_back_to_magnetic() {
        let sightings =
            parse_feed(r#"{"aircraft":[{"lat":1.0,"lon":2.0,"mag_heading":271.0,"flight":"OKL123  "}]}"#);
        assert_eq!(sightings[0].heading_deg, 271.0);
        assert_eq!(sightings[0].callsign.as_deref(), Some("OKL123"));
        assert_eq!(sightings[0].hex, "");
    }

    #[test]
    fn test_records_without_position_are_skipped() {
        let sightings = parse_feed(
            r#"{"aircraft":[{"hex":"a","lat":48.7},{"hex":"b","lat":48.7,"lon":21.2}]}"#,
        );
        assert_eq!(sightings.len(), 1);
        assert_eq!(sightings[0].hex, "b");
    }

    #[test]
    fn test_missing_aircraft_key_is_empty() {
        assert!(parse_feed(r#"{"now": 1718000000.0}"#).is_empty());
    }

    #[test]
    fn test_drone_reading_requires_coordinates() {
        let reading = DroneReading {
            latitude: Some(48.72),
            longitude: None,
            altitude: Some(120.0),
        };
        assert!(DroneState::from_reading(&reading).is_none());

        let reading = DroneReading {
            latitude: Some(48.72),
            longitude: Some(21.26),
            altitude: None,
        };
        let drone = DroneState::from_reading(&reading).unwrap();
        assert_eq!(drone.altitude, 0.0);
        assert_eq!(drone.position(), LatLng::new(48.72, 21.26));
    }

    #[test]
    fn test_snapshot_derives_warning_and_colors() {
        use crate::breach::BreachKind;

        let sightings = parse_feed(
            r#"{"aircraft":[{"hex":"low","lat":48.7,"lon":21.2,"alt_geom":0},{"hex":"high","lat":48.8,"lon":21.3,"alt_geom":30000}]}"#,
        );
        let drone = DroneState::new(48.72, 21.26, 1800.0);
        let mut zone = ZoneTracker::default();
        zone.reconcile(Some(&drone));
        let breaches = vec![
            BreachPrediction::new(BreachKind::WarningZoneBreach, 2100.0, 40.0),
            BreachPrediction::new(BreachKind::FlightZoneBreach, 9000.0, 60.0),
        ];

        let snapshot = ViewSnapshot::derive(&sightings, Some(&drone), &zone, &breaches);

        assert_eq!(snapshot.aircraft[0].color, "#ff0000");
        assert_eq!(snapshot.aircraft[1].color, "#00ff00");
        assert_eq!(snapshot.breaches[0].kind, BreachKind::FlightZoneBreach);
        assert_eq!(snapshot.status.color, "red");
        let warning = snapshot.proximity_warning.unwrap();
        assert_eq!(warning.breach.kind, BreachKind::WarningZoneBreach);
        assert!(snapshot.zone.warning_radius_m >= snapshot.zone.flight_radius_m);
    }

    #[test]
    fn test_snapshot_without_drone_has_no_warning() {
        use crate::breach::BreachKind;

        let zone = ZoneTracker::default();
        let breaches = vec![BreachPrediction::new(BreachKind::FlightZoneBreach, 0.0, 1.0)];
        let snapshot = ViewSnapshot::derive(&[], None, &zone, &breaches);
        assert!(snapshot.proximity_warning.is_none());
        assert!(snapshot.aircraft.is_empty());
        assert!(snapshot.zone.center.is_none());
    }

    #[test]
    fn test_drone_reading_rejects_out_of_range() {
        let reading = DroneReading {
            latitude: Some(123.0),
            longitude: Some(21.26),
            altitude: Some(10.0),
        };
        assert!(DroneState::from_reading(&reading).is_none());
    }
}
