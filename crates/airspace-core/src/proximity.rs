//! Vertical proximity alerting.
//!
//! Answers "is any predicted breach vertically close to the drone", not
//! "which breach is most imminent". Qualifying predictions are scanned in
//! the order the prediction service returned them and the first one wins;
//! no severity tie-break is applied.

use serde::{Deserialize, Serialize};

use crate::breach::{round_half_up, BreachPrediction};
use crate::rules::VERTICAL_SAFETY_MARGIN_M;

/// The single active operator warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityWarning {
    pub message: String,
    /// Predicted breach altitude minus drone altitude, meters
    pub altitude_gap_m: f64,
    pub breach: BreachPrediction,
}

impl ProximityWarning {
    fn for_breach(breach: &BreachPrediction, drone_altitude_m: f64) -> Self {
        let gap = breach.altitude_m - drone_altitude_m;
        Self {
            message: format!(
                "WARNING: {} IN {} SECONDS AT ALTITUDE {} m WITHIN {} m OF YOUR DRONE. DESCEND ASAP.",
                breach.kind,
                round_half_up(breach.time_to_breach_s),
                round_half_up(breach.altitude_m),
                round_half_up(gap)
            ),
            altitude_gap_m: gap,
            breach: breach.clone(),
        }
    }
}

/// True when the breach altitude is at most the safety margin above the
/// drone (aircraft already below the drone always qualify).
pub fn is_vertically_close(breach: &BreachPrediction, drone_altitude_m: f64) -> bool {
    breach.altitude_m - drone_altitude_m <= VERTICAL_SAFETY_MARGIN_M
}

/// All qualifying predictions, in service order.
pub fn close_breaches(
    predictions: &[BreachPrediction],
    drone_altitude_m: f64,
) -> Vec<&BreachPrediction> {
    predictions
        .iter()
        .filter(|breach| is_vertically_close(breach, drone_altitude_m))
        .collect()
}

/// The active warning: first qualifying prediction in service order.
pub fn active_warning(
    predictions: &[BreachPrediction],
    drone_altitude_m: f64,
) -> Option<ProximityWarning> {
    predictions
        .iter()
        .find(|breach| is_vertically_close(breach, drone_altitude_m))
        .map(|breach| ProximityWarning::for_breach(breach, drone_altitude_m))
}
