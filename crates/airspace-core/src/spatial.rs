//! Geodesic helpers for zone sizing.
//!
//! Distances are great-circle (haversine) on a spherical Earth, which is
//! well inside the tolerance of a zone measured in tens of meters.

use crate::models::LatLng;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Distance between a zone center and another point, in meters.
pub fn distance_between(a: LatLng, b: LatLng) -> f64 {
    haversine_distance(a.lat, a.lng, b.lat, b.lng)
}

/// Move a point `distance_m` along `bearing_deg` (0 = north, clockwise).
pub fn offset_by_bearing(origin: LatLng, distance_m: f64, bearing_deg: f64) -> LatLng {
    if distance_m.abs() <= f64::EPSILON {
        return origin;
    }

    let bearing = bearing_deg.to_radians();
    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lng.to_radians();
    let delta = distance_m / EARTH_RADIUS_M;

    let sin_lat2 = lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * bearing.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing.sin() * delta.sin() * lat1.cos();
    let x = delta.cos() - lat1.sin() * sin_lat2;
    let lon2 = (lon1 + y.atan2(x) + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI)
        - std::f64::consts::PI;

    LatLng::new(lat2.to_degrees(), lon2.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_degree_of_latitude() {
        let dist = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 111_195.0).abs() < 100.0);
    }

    #[test]
    fn test_zero_distance() {
        let kosice = LatLng::new(48.72026, 21.25821);
        assert_eq!(distance_between(kosice, kosice), 0.0);
    }

    #[test]
    fn test_offset_round_trips_distance() {
        let origin = LatLng::new(48.72026, 21.25821);
        for bearing in [0.0, 45.0, 90.0, 200.0] {
            let moved = offset_by_bearing(origin, 1_500.0, bearing);
            let dist = distance_between(origin, moved);
            assert!((dist - 1_500.0).abs() < 0.5, "bearing {bearing}: {dist}");
        }
    }
}
