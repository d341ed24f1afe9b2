//! Geographic primitives shared across the crate
//!
//! All coordinates are decimal degrees on the WGS84 sphere approximation,
//! latitude first. Providers that speak longitude-first are converted at the
//! boundary (see [`crate::geometry::parse_geometry`]).

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for great-circle math.
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Great-circle distance between two points, in kilometers.
pub fn haversine_km(a: LatLon, b: LatLon) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Initial great-circle bearing from `a` to `b`, in degrees within `[0, 360)`.
///
/// This is the forward azimuth at `a`; following a great circle the bearing
/// drifts, so consumers sampling a polyline should recompute per segment.
pub fn initial_bearing_deg(a: LatLon, b: LatLon) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Rounds a coordinate component to five decimal digits (~1.1 m).
///
/// Cache keys derive from rounded coordinates so that float jitter below the
/// precision collides onto the same key.
pub fn round_coordinate(value: f64) -> f64 {
    let rounded = (value * 1e5).round() / 1e5;
    // Collapse negative zero so formatted keys agree across the origin.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_known_distance() {
        // Chennai Central to Chennai Airport, roughly 16 km.
        let central = LatLon::new(13.0827, 80.2707);
        let airport = LatLon::new(12.9941, 80.1709);
        let d = haversine_km(central, airport);
        assert!(d > 13.0 && d < 17.0, "unexpected distance: {d}");
    }

    #[test]
    fn haversine_zero_for_identical_points() {
        let p = LatLon::new(13.0, 80.0);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn bearing_due_north_is_zero() {
        let a = LatLon::new(10.0, 78.0);
        let b = LatLon::new(11.0, 78.0);
        let bearing = initial_bearing_deg(a, b);
        assert!(bearing.abs() < 1e-6, "bearing was {bearing}");
    }

    #[test]
    fn bearing_due_east_is_ninety() {
        let a = LatLon::new(0.0, 78.0);
        let b = LatLon::new(0.0, 79.0);
        let bearing = initial_bearing_deg(a, b);
        assert!((bearing - 90.0).abs() < 1e-6, "bearing was {bearing}");
    }

    #[test]
    fn bearing_stays_in_range() {
        let a = LatLon::new(11.0, 78.0);
        let b = LatLon::new(10.0, 78.0);
        let bearing = initial_bearing_deg(a, b);
        assert!((0.0..360.0).contains(&bearing), "bearing was {bearing}");
    }

    #[test]
    fn round_coordinate_collides_sub_precision_jitter() {
        let base = 80.123456;
        let jittered = 80.123459;
        assert_eq!(round_coordinate(base), round_coordinate(jittered));
    }

    #[test]
    fn round_coordinate_separates_distinct_coordinates() {
        assert_ne!(round_coordinate(80.12345), round_coordinate(80.12346));
    }

    #[test]
    fn round_coordinate_collapses_negative_zero() {
        let rounded = round_coordinate(-0.000004);
        assert_eq!(format!("{rounded:.5}"), "0.00000");
    }
}
