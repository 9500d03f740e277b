//! Foundational low-level utilities shared across civic crates.
//!
//! Provides the great-circle proximity math that gates lifecycle transitions
//! and the text helpers used when logging citizen-supplied input.

pub mod geo;
pub mod text;

pub use geo::{
    distance_meters, within_range, Coordinates, ProximityCheck, DEFAULT_PROXIMITY_THRESHOLD_METERS,
    EARTH_RADIUS_METERS,
};
pub use text::{is_blank, log_preview};
