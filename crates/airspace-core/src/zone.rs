//! Safety-zone tracking.
//!
//! One geometry, two inputs: drone fixes and operator actions. The tracker
//! keeps the flight zone around the drone, raises the zone altitude as the
//! drone climbs, and applies one-shot "set zone to drone" requests.
//!
//! Auto-growth and the altitude floor write past the operator bounds on
//! purpose; only operator edits are clamped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{DroneState, LatLng, ZoneGeometry};
use crate::rules::{SettingsUpdate, ZoneBounds, ZoneSettings, ZONE_SAFETY_PAD_M};
use crate::spatial::distance_between;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneError {
    #[error("invalid zone center ({lat}, {lng})")]
    InvalidCenter { lat: f64, lng: f64 },
}

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneUpdate {
    pub center_set: bool,
    pub recentered: bool,
    pub flight_range_m: Option<f64>,
    pub altitude_m: Option<f64>,
}

impl ZoneUpdate {
    pub fn is_empty(&self) -> bool {
        !self.center_set
            && !self.recentered
            && self.flight_range_m.is_none()
            && self.altitude_m.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ZoneTracker {
    bounds: ZoneBounds,
    settings: ZoneSettings,
    center: Option<LatLng>,
    recenter_pending: bool,
}

impl Default for ZoneTracker {
    fn default() -> Self {
        Self::new(ZoneBounds::default())
    }
}

impl ZoneTracker {
    pub fn new(bounds: ZoneBounds) -> Self {
        Self {
            settings: ZoneSettings::initial(&bounds),
            bounds,
            center: None,
            recenter_pending: false,
        }
    }

    pub fn bounds(&self) -> &ZoneBounds {
        &self.bounds
    }

    pub fn settings(&self) -> &ZoneSettings {
        &self.settings
    }

    pub fn center(&self) -> Option<LatLng> {
        self.center
    }

    pub fn recenter_pending(&self) -> bool {
        self.recenter_pending
    }

    pub fn geometry(&self) -> ZoneGeometry {
        ZoneGeometry {
            center: self.center,
            flight_radius_m: self.settings.flight_range,
            warning_radius_m: self.settings.warning_radius_m(),
        }
    }

    /// Operator click: put the center at an explicit point.
    pub fn set_center(&mut self, center: LatLng) -> Result<(), ZoneError> {
        if !center.is_valid() {
            return Err(ZoneError::InvalidCenter {
                lat: center.lat,
                lng: center.lng,
            });
        }
        self.center = Some(center);
        Ok(())
    }

    /// Operator "set zone to drone". Held until the next valid drone fix,
    /// applied once, then cleared.
    pub fn request_recenter(&mut self) {
        self.recenter_pending = true;
    }

    /// Operator edit of numeric settings or view flags; numbers are clamped.
    pub fn update_settings(&mut self, update: &SettingsUpdate) {
        self.settings.apply(update, &self.bounds);
    }

    /// Operator resize of the flight zone.
    pub fn resize(&mut self, flight_range_m: f64) {
        self.update_settings(&SettingsUpdate {
            flight_range: Some(flight_range_m),
            ..Default::default()
        });
    }

    pub fn toggle_center_on_drone(&mut self) -> bool {
        self.settings.center_on_drone = !self.settings.center_on_drone;
        self.settings.center_on_drone
    }

    pub fn toggle_labels(&mut self) -> bool {
        self.settings.show_labels = !self.settings.show_labels;
        self.settings.show_labels
    }

    /// Bring the geometry in line with the latest drone fix.
    ///
    /// Called on every valid fix and after every operator action; without a
    /// fix there is nothing to reconcile.
    pub fn reconcile(&mut self, drone: Option<&DroneState>) -> ZoneUpdate {
        let mut update = ZoneUpdate::default();
        let Some(drone) = drone else {
            return update;
        };
        let position = drone.position();

        if self.recenter_pending {
            self.center = Some(position);
            self.recenter_pending = false;
            update.recentered = true;
        }

        match self.center {
            None => {
                self.center = Some(position);
                update.center_set = true;
            }
            Some(center) => {
                let distance = distance_between(center, position) + ZONE_SAFETY_PAD_M;
                let current = self.settings.flight_range;
                let cap = self.bounds.flight_range.upper();
                if distance > current || (distance < cap && current > cap) {
                    let grown = distance.max(cap);
                    if grown != current {
                        self.settings.flight_range = grown;
                        update.flight_range_m = Some(grown);
                    }
                }
            }
        }

        if drone.altitude > self.settings.altitude {
            self.settings.altitude = drone.altitude;
            update.altitude_m = Some(drone.altitude);
        }

        update
    }
}
