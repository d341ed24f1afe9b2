//! Tests for the HTTP surface: status mapping, error bodies, CORS headers,
//! and the preflight response.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use helpers::{ScriptedGeocoder, ScriptedRouter};
use routecast::{
    api, EdgeRouteResolver, GeocodeResolver, KvStore, RateLimiter, StopListStore,
};
use tempfile::TempDir;
use tower::ServiceExt;

fn test_router(geocoder: ScriptedGeocoder, router: ScriptedRouter) -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();

    let resolver = Arc::new(EdgeRouteResolver::new(
        GeocodeResolver::new(Arc::new(geocoder))
            .with_limiter(RateLimiter::with_min_delay(Duration::ZERO)),
        Arc::new(router),
        KvStore::new(dir.path().join("edge_cache.json")),
        StopListStore::new(dir.path().join("buses.json")),
    ));

    (api::router(resolver), dir)
}

fn chennai_geocoder() -> ScriptedGeocoder {
    ScriptedGeocoder::new()
        .with_place("Tambaram bus stop", "Tambaram", 12.9249, 80.1000)
        .with_place("Guindy bus stop", "Guindy", 13.0067, 80.2206)
}

fn post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/route/resolve")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .expect("request builds")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is JSON")
}

#[tokio::test]
async fn single_stop_maps_to_400_with_typed_body() {
    let (app, _dir) = test_router(chennai_geocoder(), ScriptedRouter::new());

    let response = app.oneshot(post(r#"{"stops":["Tambaram"]}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some(&header::HeaderValue::from_static("*"))
    );

    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid_request");
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn unknown_bus_maps_to_404() {
    let (app, _dir) = test_router(chennai_geocoder(), ScriptedRouter::new());

    let response = app.oneshot(post(r#"{"busId":"bus-99"}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn unresolvable_stops_map_to_422() {
    let (app, _dir) = test_router(ScriptedGeocoder::new(), ScriptedRouter::new());

    let response = app
        .oneshot(post(r#"{"stops":["Nowhere","Ghost"]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "geocode_insufficient");
}

#[tokio::test]
async fn unroutable_waypoints_map_to_502() {
    let (app, _dir) = test_router(chennai_geocoder(), ScriptedRouter::unroutable());

    let response = app
        .oneshot(post(r#"{"stops":["Tambaram","Guindy"]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "routing_unavailable");
}

#[tokio::test]
async fn successful_resolution_round_trips_through_http() {
    let (app, _dir) = test_router(chennai_geocoder(), ScriptedRouter::new());

    let first = app
        .clone()
        .oneshot(post(r#"{"stops":["Tambaram","Guindy"]}"#))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first_body = body_json(first).await;
    assert_eq!(first_body["fromCache"], false);
    assert_eq!(first_body["stops"], serde_json::json!(["Tambaram", "Guindy"]));
    assert_eq!(first_body["distanceKm"], 18.5);
    assert_eq!(first_body["geometry"][0]["lat"], 13.08);

    let second = app
        .oneshot(post(r#"{"stops":["Tambaram","Guindy"]}"#))
        .await
        .unwrap();
    let second_body = body_json(second).await;
    assert_eq!(second_body["fromCache"], true);
}

#[tokio::test]
async fn preflight_is_zero_logic_with_cors_headers() {
    let (app, _dir) = test_router(ScriptedGeocoder::new(), ScriptedRouter::new());

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/v1/route/resolve")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some(&header::HeaderValue::from_static("*"))
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_METHODS),
        Some(&header::HeaderValue::from_static("POST, OPTIONS"))
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS),
        Some(&header::HeaderValue::from_static("content-type"))
    );
}

#[tokio::test]
async fn health_endpoint_answers() {
    let (app, _dir) = test_router(ScriptedGeocoder::new(), ScriptedRouter::new());

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
