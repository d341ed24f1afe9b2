//! Geospatial route resolution, caching, and motion smoothing for live
//! vehicle tracking.
//!
//! The pipeline: a stop-name sequence is geocoded with anchor-based
//! disambiguation ([`geocode`]), route geometry is fetched and cached in two
//! tiers ([`cache`]), CPU-heavy geometry math runs on an isolated worker
//! task ([`worker`]), filtered position fixes drive a frame-scheduled marker
//! interpolation ([`motion`]), and a server-side resolver consolidates the
//! whole geocode+route sequence behind one durable-cached endpoint
//! ([`edge`], [`api`]).

pub mod api;
pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod edge;
pub mod errors;
pub mod geo;
pub mod geocode;
pub mod geometry;
pub mod limiter;
pub mod motion;
pub mod routing;
pub mod worker;

pub use cache::types::TimestampMillis;
pub use cache::{CacheStats, CachedRoute, DiskTier, MemoryTier, RouteCache, RouteKey};
pub use edge::{
    BusRecord, EdgeCacheEntry, EdgeRequest, EdgeResponse, EdgeRouteResolver, KvStore,
    StopListStore,
};
pub use errors::{CacheError, EdgeError, ProviderError, RoutecastError, WorkerError};
pub use geo::LatLon;
pub use geocode::{
    GeocodeCandidate, GeocodeProvider, GeocodeResolver, GeocodeResult, NominatimClient,
};
pub use geometry::ArrowBearing;
pub use limiter::RateLimiter;
pub use motion::{Marker, MotionInterpolator};
pub use routing::{OsrmClient, RoutePlan, RoutingProvider};
pub use worker::{GeometryRequest, GeometryResponse, GeometryWorker, GeometryWorkerHandle};
