//! Consolidated server-side route resolution
//!
//! Clients can geocode and route for themselves, but every client doing so
//! independently repeats the same provider calls and the same coordinate
//! transform. The edge resolver performs the geocode → route → transform
//! sequence once per unique stop list, durably caches the result for 24
//! hours, and serves every subsequent caller from the cache.
//!
//! The resolver runs in its own execution context and shares no state with
//! client-tier components: it owns a private [`GeocodeResolver`] (with its
//! own rate limiter and session cache) and its own durable stores.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::constants::cache as cache_config;
use crate::errors::{EdgeError, ProviderError};
use crate::geo::LatLon;
use crate::geocode::GeocodeResolver;
use crate::geometry::parse_geometry;
use crate::routing::RoutingProvider;

mod store;

pub use store::{BusRecord, KvStore, StopListStore};

/// Request body of the resolution contract.
///
/// A direct `stops` list takes priority; otherwise the stop list is looked
/// up by `busId` (or `busName`) in the record store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRequest {
    #[serde(default)]
    pub bus_id: Option<String>,
    #[serde(default)]
    pub bus_name: Option<String>,
    #[serde(default)]
    pub stops: Option<Vec<String>>,
}

/// Successful response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeResponse {
    /// Stop names as corrected by geocoding
    pub stops: Vec<String>,
    /// Route polyline, lat-first (transformed server-side)
    pub geometry: Vec<LatLon>,
    pub distance_km: f64,
    pub duration_sec: f64,
    pub cached_at: DateTime<Utc>,
    pub from_cache: bool,
}

/// The cached resolution record, without the per-response `from_cache` bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeCacheEntry {
    pub stops: Vec<String>,
    pub geometry: Vec<LatLon>,
    pub distance_km: f64,
    pub duration_sec: f64,
    pub cached_at: DateTime<Utc>,
}

impl EdgeCacheEntry {
    fn into_response(self, from_cache: bool) -> EdgeResponse {
        EdgeResponse {
            stops: self.stops,
            geometry: self.geometry,
            distance_km: self.distance_km,
            duration_sec: self.duration_sec,
            cached_at: self.cached_at,
            from_cache,
        }
    }
}

/// Deterministic, bounded-length cache key over the ordered raw stop names.
///
/// Stop names are trimmed and lower-cased before hashing so that repeated
/// requests for the same human-entered list collide; a separator byte keeps
/// adjacent names from running together.
pub fn cache_key(stops: &[String]) -> String {
    let mut hasher = Sha256::new();
    for stop in stops {
        hasher.update(stop.trim().to_lowercase().as_bytes());
        hasher.update([0u8]);
    }
    format!("route:{}", hex::encode(hasher.finalize()))
}

/// Stateless request/response handler consolidating geocoding, routing, and
/// durable TTL caching.
pub struct EdgeRouteResolver {
    geocoder: GeocodeResolver,
    routing: Arc<dyn RoutingProvider>,
    cache: KvStore,
    stop_lists: StopListStore,
    profile: String,
    ttl: Duration,
}

impl EdgeRouteResolver {
    pub fn new(
        geocoder: GeocodeResolver,
        routing: Arc<dyn RoutingProvider>,
        cache: KvStore,
        stop_lists: StopListStore,
    ) -> Self {
        Self {
            geocoder,
            routing,
            cache,
            stop_lists,
            profile: "driving".to_owned(),
            ttl: cache_config::EDGE_CACHE_TTL,
        }
    }

    /// Overrides the cache TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Overrides the routing profile.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Resolves a request to route geometry, from cache when possible.
    pub async fn resolve(&self, request: EdgeRequest) -> Result<EdgeResponse, EdgeError> {
        let stops = self.stop_names(&request).await?;
        if stops.len() < 2 {
            return Err(EdgeError::invalid_request(format!(
                "at least two stops are required, got {}",
                stops.len()
            )));
        }

        // Durable lookup happens before any external call.
        let key = cache_key(&stops);
        if let Some(entry) = self.cache.get::<EdgeCacheEntry>(&key).await {
            debug!(key = %key, "Serving consolidated route from cache");
            return Ok(entry.into_response(true));
        }

        let resolved: Vec<_> = self
            .geocoder
            .resolve_sequence(&stops)
            .await
            .into_iter()
            .flatten()
            .collect();

        if resolved.len() < 2 {
            return Err(EdgeError::GeocodeInsufficient {
                resolved: resolved.len(),
                requested: stops.len(),
            });
        }

        let waypoints: Vec<LatLon> = resolved.iter().map(|r| r.position).collect();
        let plan = self
            .routing
            .fetch_route(&waypoints, &self.profile)
            .await
            .map_err(|e| match e {
                ProviderError::Parse { .. } => EdgeError::internal(e.to_string()),
                other => EdgeError::RoutingUnavailable {
                    details: other.to_string(),
                },
            })?;

        // Transform coordinate order once, here, for every future consumer
        // of the cached result.
        let (geometry, distance_km) = parse_geometry(&plan.geometry, plan.distance_meters);

        let entry = EdgeCacheEntry {
            stops: resolved.into_iter().map(|r| r.corrected_name).collect(),
            geometry,
            distance_km,
            duration_sec: plan.duration_seconds,
            cached_at: Utc::now(),
        };

        if let Err(e) = self.cache.set(&key, &entry, self.ttl).await {
            warn!(error = %e, "Edge cache write failed, serving uncached result");
        }

        info!(
            key = %key,
            stops = entry.stops.len(),
            distance_km = entry.distance_km,
            "Resolved consolidated route"
        );
        Ok(entry.into_response(false))
    }

    async fn stop_names(&self, request: &EdgeRequest) -> Result<Vec<String>, EdgeError> {
        if let Some(stops) = &request.stops {
            return Ok(stops.clone());
        }

        let reference = request
            .bus_id
            .clone()
            .or_else(|| request.bus_name.clone())
            .ok_or_else(|| {
                EdgeError::invalid_request("one of stops, busId, or busName is required")
            })?;

        self.stop_lists
            .find(&reference)
            .await
            .map(|record| record.stops)
            .ok_or_else(|| EdgeError::not_found(reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn cache_key_is_deterministic_and_bounded() {
        let a = cache_key(&stops(&["Tambaram", "Guindy"]));
        let b = cache_key(&stops(&["Tambaram", "Guindy"]));
        assert_eq!(a, b);
        // "route:" + 64 hex chars, regardless of stop count or name length.
        assert_eq!(a.len(), 70);

        let many = vec!["a very long stop name that keeps going".to_owned(); 100];
        assert_eq!(cache_key(&many).len(), 70);
    }

    #[test]
    fn cache_key_normalizes_case_and_whitespace() {
        assert_eq!(
            cache_key(&stops(&["  Tambaram ", "GUINDY"])),
            cache_key(&stops(&["tambaram", "guindy"]))
        );
    }

    #[test]
    fn cache_key_is_order_sensitive() {
        assert_ne!(
            cache_key(&stops(&["Tambaram", "Guindy"])),
            cache_key(&stops(&["Guindy", "Tambaram"]))
        );
    }

    #[test]
    fn cache_key_separates_adjacent_names() {
        assert_ne!(
            cache_key(&stops(&["ab", "c"])),
            cache_key(&stops(&["a", "bc"]))
        );
    }
}
