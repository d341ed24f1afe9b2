// SPDX-FileCopyrightText: 2026 routecast contributors
//
// SPDX-License-Identifier: Apache-2.0

//! OSRM HTTP routing client

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{RoutePlan, RoutingProvider};
use crate::config::constants::providers;
use crate::errors::ProviderError;
use crate::geo::LatLon;

/// Response shape of `GET /route/v1/{profile}/{coordinates}`.
#[derive(Debug, Deserialize)]
struct OsrmResponse {
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    /// Total distance in meters
    distance: f64,
    /// Total duration in seconds
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// GeoJSON LineString coordinates, `[lon, lat]` pairs
    coordinates: Vec<[f64; 2]>,
}

/// Routing client for an OSRM-compatible HTTP endpoint.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    base_url: String,
    client: reqwest::Client,
}

impl OsrmClient {
    /// Creates a client against the public OSRM demo endpoint.
    pub fn new() -> Self {
        Self::with_base_url(providers::OSRM_URL)
    }

    /// Creates a client against a custom OSRM-compatible endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for OsrmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoutingProvider for OsrmClient {
    async fn fetch_route(
        &self,
        waypoints: &[LatLon],
        profile: &str,
    ) -> Result<RoutePlan, ProviderError> {
        let coordinates = waypoints
            .iter()
            .map(|p| format!("{},{}", p.lon, p.lat))
            .collect::<Vec<_>>()
            .join(";");
        let url = format!(
            "{}/route/v1/{}/{}",
            self.base_url.trim_end_matches('/'),
            profile,
            coordinates
        );

        debug!(waypoints = waypoints.len(), profile, "Requesting route");

        let response = self
            .client
            .get(&url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .header(reqwest::header::USER_AGENT, providers::USER_AGENT)
            .send()
            .await
            .map_err(|e| ProviderError::http("routing request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::status(status.as_u16(), body));
        }

        let parsed: OsrmResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::http("decoding routing response", e))?;

        parsed
            .routes
            .into_iter()
            .next()
            .map(|route| RoutePlan {
                geometry: route.geometry.coordinates,
                distance_meters: route.distance,
                duration_seconds: route.duration,
            })
            .ok_or(ProviderError::NoRoute)
    }
}
