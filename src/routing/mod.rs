//! Road routing provider abstraction
//!
//! A [`RoutingProvider`] turns an ordered waypoint list into road-snapped
//! geometry. The trait is object-safe so callers hold `Arc<dyn
//! RoutingProvider>` and tests substitute scripted implementations; the
//! production implementation is [`OsrmClient`].
//!
//! Providers speak longitude-first coordinates; nothing in this crate
//! consumes a [`RoutePlan`] without going through
//! [`parse_geometry`](crate::geometry::parse_geometry) first.

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::geo::LatLon;

mod osrm;

pub use osrm::OsrmClient;

/// A route as returned by the provider, untransformed.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    /// Route geometry as `[lon, lat]` pairs, provider convention.
    pub geometry: Vec<[f64; 2]>,
    /// Total route length in meters.
    pub distance_meters: f64,
    /// Estimated travel time in seconds.
    pub duration_seconds: f64,
}

/// Trait for road routing providers.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// Fetches a road-snapped route visiting `waypoints` in order.
    ///
    /// `profile` is the routing mode identifier (e.g. `driving`). Returns
    /// [`ProviderError::NoRoute`] when the provider cannot connect the
    /// waypoints.
    async fn fetch_route(
        &self,
        waypoints: &[LatLon],
        profile: &str,
    ) -> Result<RoutePlan, ProviderError>;
}
