//! Tests for the geometry worker protocol end to end: typed handle methods,
//! the tagged wire form, and isolation between messages.

use routecast::{worker, GeometryWorker, LatLon};
use serde_json::json;

#[tokio::test]
async fn parse_geometry_over_the_channel() {
    let handle = GeometryWorker::spawn();

    let (points, distance_km) = handle
        .parse_geometry(vec![[80.27, 13.08], [80.22, 13.03], [80.17, 12.99]], 18_500.0)
        .await
        .unwrap();

    assert_eq!(
        points,
        vec![
            LatLon::new(13.08, 80.27),
            LatLon::new(13.03, 80.22),
            LatLon::new(12.99, 80.17),
        ]
    );
    assert_eq!(distance_km, 18.5);
}

#[tokio::test]
async fn arrow_bearings_along_a_due_north_path() {
    let handle = GeometryWorker::spawn();

    let points: Vec<LatLon> = (0..40)
        .map(|i| LatLon::new(10.0 + i as f64 * 0.01, 78.0))
        .collect();
    let bearings = handle.compute_arrow_bearings(points).await.unwrap();

    assert!(!bearings.is_empty());
    assert!(bearings.len() <= 8);
    for sample in bearings {
        assert!(sample.bearing_deg.abs() < 1e-6);
    }
}

#[tokio::test]
async fn haversine_chain_of_one_equatorial_degree() {
    let handle = GeometryWorker::spawn();

    let total = handle
        .haversine_chain(vec![LatLon::new(0.0, 0.0), LatLon::new(0.0, 1.0)])
        .await
        .unwrap();

    // One degree of longitude at the equator is ~111.2 km.
    assert!((total - 111.2).abs() < 0.5);
}

#[tokio::test]
async fn gps_filter_drops_the_jitter_fix() {
    let handle = GeometryWorker::spawn();

    let filtered = handle
        .filter_noisy_gps(
            vec![
                LatLon::new(0.0, 0.0),
                LatLon::new(0.0, 0.00005),
                LatLon::new(0.0, 0.001),
            ],
            20.0,
        )
        .await
        .unwrap();

    assert_eq!(filtered, vec![LatLon::new(0.0, 0.0), LatLon::new(0.0, 0.001)]);
}

#[tokio::test]
async fn handle_clones_share_one_worker() {
    let handle = GeometryWorker::spawn();
    let other = handle.clone();

    let a = handle
        .haversine_chain(vec![LatLon::new(0.0, 0.0), LatLon::new(0.0, 1.0)])
        .await
        .unwrap();
    let b = other
        .haversine_chain(vec![LatLon::new(0.0, 0.0), LatLon::new(0.0, 1.0)])
        .await
        .unwrap();

    assert_eq!(a, b);
}

#[test]
fn wire_form_round_trips_each_operation() {
    let response = worker::handle_raw(json!({
        "type": "computeArrowBearings",
        "points": [
            {"lat": 10.0, "lon": 78.0},
            {"lat": 10.1, "lon": 78.0},
            {"lat": 10.2, "lon": 78.0}
        ]
    }))
    .unwrap();

    assert_eq!(response["type"], "computeArrowBearings");
    let bearings = response["bearings"].as_array().unwrap();
    assert!(!bearings.is_empty());
    assert!(bearings[0]["bearingDeg"].as_f64().unwrap().abs() < 1e-6);
}

#[test]
fn wire_form_defaults_the_gps_threshold() {
    let response = worker::handle_raw(json!({
        "type": "filterNoisyGps",
        "fixes": [
            {"lat": 0.0, "lon": 0.0},
            {"lat": 0.0, "lon": 0.00005},
            {"lat": 0.0, "lon": 0.001}
        ]
    }))
    .unwrap();

    // The 20 m default drops the ~5.5 m jitter fix.
    assert_eq!(response["fixes"].as_array().unwrap().len(), 2);
}

#[test]
fn unrecognized_wire_type_produces_no_response() {
    assert!(worker::handle_raw(json!({"type": "projectMercator", "points": []})).is_none());
    assert!(worker::handle_raw(json!({"no_type_at_all": true})).is_none());
}
