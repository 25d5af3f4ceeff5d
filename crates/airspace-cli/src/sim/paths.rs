//! Simulated drone flight paths.

use std::f64::consts::PI;

use airspace_core::spatial::{haversine_distance, offset_by_bearing};
use airspace_core::LatLng;

/// A path the simulated drone follows.
pub trait FlightPath: Send + Sync {
    /// (lat, lon, altitude_m) at `t` seconds from start.
    fn position(&self, t: f64) -> (f64, f64, f64);

    /// Seconds until the path ends, `None` for paths that repeat.
    fn duration(&self) -> Option<f64> {
        None
    }
}

/// Altitude that starts at `base_m` and changes by `rate_mps`, never below 0.
#[derive(Debug, Clone, Copy)]
pub struct Climb {
    pub base_m: f64,
    pub rate_mps: f64,
}

impl Climb {
    pub fn level(altitude_m: f64) -> Self {
        Self {
            base_m: altitude_m,
            rate_mps: 0.0,
        }
    }

    pub fn at(&self, t: f64) -> f64 {
        (self.base_m + self.rate_mps * t).max(0.0)
    }
}

/// A drone holding one position.
pub struct FixedPoint {
    pub position: LatLng,
    pub climb: Climb,
}

impl FlightPath for FixedPoint {
    fn position(&self, t: f64) -> (f64, f64, f64) {
        (self.position.lat, self.position.lng, self.climb.at(t))
    }
}

/// Circle around a center point.
pub struct CircularPath {
    pub center: LatLng,
    pub radius_m: f64,
    pub speed_mps: f64,
    pub climb: Climb,
    pub clockwise: bool,
    period: f64,
}

impl CircularPath {
    pub fn new(center: LatLng, radius_m: f64, speed_mps: f64, climb: Climb, clockwise: bool) -> Self {
        let circumference = 2.0 * PI * radius_m;
        let period = if speed_mps > 0.0 {
            circumference / speed_mps
        } else {
            f64::INFINITY
        };

        Self {
            center,
            radius_m,
            speed_mps,
            climb,
            clockwise,
            period,
        }
    }

    /// Seconds for one lap.
    pub fn period(&self) -> f64 {
        self.period
    }
}

impl FlightPath for CircularPath {
    fn position(&self, t: f64) -> (f64, f64, f64) {
        let mut bearing = 360.0 * t / self.period;
        if !self.clockwise {
            bearing = -bearing;
        }
        let point = offset_by_bearing(self.center, self.radius_m, bearing);
        (point.lat, point.lng, self.climb.at(t))
    }
}

/// Straight line between two points, holding the end once reached.
pub struct LinearPath {
    pub start: LatLng,
    pub end: LatLng,
    pub speed_mps: f64,
    pub climb: Climb,
    pub distance_m: f64,
    duration: f64,
}

impl LinearPath {
    pub fn new(start: LatLng, end: LatLng, speed_mps: f64, climb: Climb) -> Self {
        let distance_m = haversine_distance(start.lat, start.lng, end.lat, end.lng);
        let duration = if speed_mps > 0.0 {
            distance_m / speed_mps
        } else {
            0.0
        };

        Self {
            start,
            end,
            speed_mps,
            climb,
            distance_m,
            duration,
        }
    }
}

impl FlightPath for LinearPath {
    fn position(&self, t: f64) -> (f64, f64, f64) {
        let progress = if self.duration > 0.0 {
            (t / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let lat = self.start.lat + progress * (self.end.lat - self.start.lat);
        let lon = self.start.lng + progress * (self.end.lng - self.start.lng);

        (lat, lon, self.climb.at(t))
    }

    fn duration(&self) -> Option<f64> {
        Some(self.duration)
    }
}
