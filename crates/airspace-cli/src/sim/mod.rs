//! Drone position simulation.

mod paths;

pub use paths::{CircularPath, Climb, FixedPoint, FlightPath, LinearPath};
