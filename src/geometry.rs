//! Pure geometry transforms
//!
//! The CPU-heavy math behind the geometry worker, kept as plain functions
//! over slices so they are trivially testable and reusable server-side (the
//! edge resolver transforms coordinate order once for all consumers of a
//! cached result).

use serde::{Deserialize, Serialize};

use crate::config::constants::geometry;
use crate::geo::{haversine_km, initial_bearing_deg, LatLon};

/// A sampled route point annotated with travel direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowBearing {
    pub lat: f64,
    pub lon: f64,
    /// Initial great-circle bearing toward the next sample, degrees `[0, 360)`
    pub bearing_deg: f64,
}

/// Converts provider geometry into consumer convention.
///
/// Providers emit `[lon, lat]` pairs and meters; consumers want lat-first
/// points and kilometers. Returns the reordered points and the distance in
/// kilometers.
pub fn parse_geometry(geometry: &[[f64; 2]], total_distance_meters: f64) -> (Vec<LatLon>, f64) {
    let points = geometry
        .iter()
        .map(|&[lon, lat]| LatLon::new(lat, lon))
        .collect();
    (points, total_distance_meters / 1000.0)
}

/// Samples up to eight points along a route with their travel bearings.
///
/// Stride is `max(1, len / 8)`; the bearing at each sample is the initial
/// great-circle bearing toward the next sampled point.
pub fn compute_arrow_bearings(points: &[LatLon]) -> Vec<ArrowBearing> {
    if points.len() < 2 {
        return Vec::new();
    }

    let stride = (points.len() / geometry::MAX_ARROW_SAMPLES).max(1);
    let mut samples = Vec::new();
    let mut index = 0;

    while index + 1 < points.len() && samples.len() < geometry::MAX_ARROW_SAMPLES {
        let next = (index + stride).min(points.len() - 1);
        samples.push(ArrowBearing {
            lat: points[index].lat,
            lon: points[index].lon,
            bearing_deg: initial_bearing_deg(points[index], points[next]),
        });
        index += stride;
    }

    samples
}

/// Total great-circle length of a polyline, in kilometers.
pub fn haversine_chain(points: &[LatLon]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_km(pair[0], pair[1]))
        .sum()
}

/// Suppresses GPS jitter by dropping fixes that barely move.
///
/// The first fix is kept unconditionally; each later fix is kept only if its
/// great-circle distance from the last *kept* fix is at least
/// `min_distance_meters`. Single-pass and greedy - a stationary vehicle
/// collapses to one fix, at the cost of global optimality.
pub fn filter_noisy_gps(fixes: &[LatLon], min_distance_meters: f64) -> Vec<LatLon> {
    let mut kept: Vec<LatLon> = Vec::with_capacity(fixes.len().min(16));

    for &fix in fixes {
        match kept.last() {
            None => kept.push(fix),
            Some(&last) => {
                if haversine_km(last, fix) * 1000.0 >= min_distance_meters {
                    kept.push(fix);
                }
            }
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants::geometry::GPS_MIN_DISTANCE_METERS;

    #[test]
    fn parse_geometry_swaps_order_and_converts_units() {
        let raw = [[80.27, 13.08], [80.17, 12.99]];
        let (points, distance_km) = parse_geometry(&raw, 18500.0);

        assert_eq!(points, vec![LatLon::new(13.08, 80.27), LatLon::new(12.99, 80.17)]);
        assert_eq!(distance_km, 18.5);
    }

    #[test]
    fn parse_geometry_of_empty_route() {
        let (points, distance_km) = parse_geometry(&[], 0.0);
        assert!(points.is_empty());
        assert_eq!(distance_km, 0.0);
    }

    #[test]
    fn arrow_bearings_due_north_path() {
        let points: Vec<LatLon> = (0..20).map(|i| LatLon::new(10.0 + i as f64 * 0.01, 78.0)).collect();
        let bearings = compute_arrow_bearings(&points);

        assert!(!bearings.is_empty());
        assert!(bearings.len() <= 8);
        for sample in &bearings {
            assert!(sample.bearing_deg.abs() < 1e-6, "bearing was {}", sample.bearing_deg);
        }
    }

    #[test]
    fn arrow_bearings_caps_at_eight_samples() {
        let points: Vec<LatLon> = (0..1000).map(|i| LatLon::new(10.0 + i as f64 * 0.001, 78.0)).collect();
        assert!(compute_arrow_bearings(&points).len() <= 8);
    }

    #[test]
    fn arrow_bearings_short_path_uses_unit_stride() {
        let points = vec![LatLon::new(10.0, 78.0), LatLon::new(10.0, 78.01), LatLon::new(10.01, 78.01)];
        let bearings = compute_arrow_bearings(&points);
        assert_eq!(bearings.len(), 2);
        assert!((bearings[0].bearing_deg - 90.0).abs() < 1.0);
    }

    #[test]
    fn arrow_bearings_empty_below_two_points() {
        assert!(compute_arrow_bearings(&[]).is_empty());
        assert!(compute_arrow_bearings(&[LatLon::new(10.0, 78.0)]).is_empty());
    }

    #[test]
    fn haversine_chain_sums_segments() {
        let points = vec![
            LatLon::new(0.0, 0.0),
            LatLon::new(0.0, 1.0),
            LatLon::new(0.0, 2.0),
        ];
        let total = haversine_chain(&points);
        let direct = haversine_km(points[0], points[2]);
        assert!((total - direct).abs() < 0.01);

        assert_eq!(haversine_chain(&[LatLon::new(0.0, 0.0)]), 0.0);
        assert_eq!(haversine_chain(&[]), 0.0);
    }

    #[test]
    fn gps_filter_drops_jitter_keeps_motion() {
        // ~5.5 m of jitter, then a real ~111 m move.
        let fixes = vec![
            LatLon::new(0.0, 0.0),
            LatLon::new(0.0, 0.00005),
            LatLon::new(0.0, 0.001),
        ];

        let kept = filter_noisy_gps(&fixes, GPS_MIN_DISTANCE_METERS);
        assert_eq!(kept, vec![LatLon::new(0.0, 0.0), LatLon::new(0.0, 0.001)]);
    }

    #[test]
    fn gps_filter_measures_from_last_kept_fix() {
        // Each step is ~11 m; none alone clears 20 m, but drift accumulates
        // past the threshold relative to the last kept fix.
        let fixes: Vec<LatLon> = (0..5).map(|i| LatLon::new(0.0, i as f64 * 0.0001)).collect();
        let kept = filter_noisy_gps(&fixes, GPS_MIN_DISTANCE_METERS);

        assert_eq!(kept.first(), Some(&LatLon::new(0.0, 0.0)));
        assert!(kept.len() > 1, "accumulated drift should survive the filter");
        assert!(kept.len() < fixes.len(), "per-step jitter should be dropped");
    }

    #[test]
    fn gps_filter_keeps_first_fix_unconditionally() {
        let fixes = vec![LatLon::new(0.0, 0.0)];
        assert_eq!(filter_noisy_gps(&fixes, GPS_MIN_DISTANCE_METERS), fixes);
        assert!(filter_noisy_gps(&[], GPS_MIN_DISTANCE_METERS).is_empty());
    }
}
