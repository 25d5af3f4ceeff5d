//! Airspace CLI - manual test harness for the airspace monitor.
//!
//! - send_drone_location: posts drone fixes to the self-report endpoint

pub mod sim;
