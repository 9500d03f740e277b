use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Proximity threshold applied when no configuration overrides it.
pub const DEFAULT_PROXIMITY_THRESHOLD_METERS: f64 = 200.0;

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        distance_meters(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// Haversine great-circle distance between two points, in meters.
pub fn distance_meters(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let phi_a = lat_a.to_radians();
    let phi_b = lat_b.to_radians();
    let delta_phi = (lat_b - lat_a).to_radians();
    let delta_lambda = (lon_b - lon_a).to_radians();

    let half_chord = (delta_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (delta_lambda / 2.0).sin().powi(2);
    // Rounding can push the chord fraction a hair outside [0, 1] for antipodal points.
    let half_chord = half_chord.clamp(0.0, 1.0);
    let angle = 2.0 * half_chord.sqrt().atan2((1.0 - half_chord).sqrt());

    EARTH_RADIUS_METERS * angle
}

/// Returns true when `distance` does not exceed `threshold_meters`.
pub fn within_range(distance: f64, threshold_meters: f64) -> bool {
    distance <= threshold_meters
}

/// Outcome of a single point-in-time proximity check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityCheck {
    pub distance_meters: f64,
    pub threshold_meters: f64,
}

impl ProximityCheck {
    pub fn measure(reference: &Coordinates, actor: &Coordinates, threshold_meters: f64) -> Self {
        Self {
            distance_meters: reference.distance_to(actor),
            threshold_meters,
        }
    }

    pub fn passed(&self) -> bool {
        within_range(self.distance_meters, self.threshold_meters)
    }
}
