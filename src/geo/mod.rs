// Geodesy helpers for trip segments.

/// A position in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Builds a coordinate from the E7 fixed-point integers used by the
    /// Google Timeline export format (degrees × 1e7).
    pub fn from_e7(lat_e7: i64, lon_e7: i64) -> Self {
        Coordinate {
            lat: lat_e7 as f64 / 1e7,
            lon: lon_e7 as f64 / 1e7,
        }
    }
}

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates, in kilometers.
///
/// Uses the haversine formula. Output is deterministic, so tests can pin
/// known distances to two decimal places.
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlat = (to.lat - from.lat).to_radians();
    let dlon = (to.lon - from.lon).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}
