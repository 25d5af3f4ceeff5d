//! Altitude threat coloring for tracked aircraft.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::rules::THREAT_BAND_M;

/// An opaque RGB color, displayed as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Red below `threshold_m`, green above `threshold_m + 2000`, blended
/// linearly in between. Blue is always 0.
pub fn threat_color(altitude_m: f64, threshold_m: f64) -> Rgb {
    let ratio = if altitude_m < threshold_m || altitude_m.is_nan() {
        0.0
    } else if altitude_m > threshold_m + THREAT_BAND_M {
        1.0
    } else {
        (altitude_m - threshold_m) / THREAT_BAND_M
    };

    Rgb {
        r: (255.0 * (1.0 - ratio)).round() as u8,
        g: (255.0 * ratio).round() as u8,
        b: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_pure_red() {
        assert_eq!(threat_color(30.0, 30.0).to_string(), "#ff0000");
        assert_eq!(threat_color(-100.0, 30.0).to_string(), "#ff0000");
    }

    #[test]
    fn test_top_of_band_is_pure_green() {
        assert_eq!(threat_color(2030.0, 30.0).to_string(), "#00ff00");
        assert_eq!(threat_color(11_000.0, 30.0).to_string(), "#00ff00");
    }

    #[test]
    fn test_midpoint_is_olive() {
        assert_eq!(threat_color(1030.0, 30.0).to_string(), "#808000");
    }

    #[test]
    fn test_colorizer_is_idempotent() {
        let a = threat_color(777.0, 120.0);
        let b = threat_color(777.0, 120.0);
        assert_eq!(a, b);
        assert_eq!(a.b, 0);
    }

    #[test]
    fn test_serializes_as_hex() {
        let json = serde_json::to_string(&threat_color(30.0, 30.0)).unwrap();
        assert_eq!(json, "\"#ff0000\"");
    }
}
