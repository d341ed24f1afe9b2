//! Two-tier route geometry cache
//!
//! Route geometry is expensive to fetch and perfectly deterministic for a
//! given waypoint sequence, which makes it an ideal cache subject. This
//! module provides:
//!
//! - [`MemoryTier`]: volatile in-process store, always consulted first
//! - [`DiskTier`]: durable JSON-file store with corrupt-entry tolerance
//! - [`RouteCache`]: the two-tier orchestrator with promotion and prewarm
//!
//! # Invariants
//!
//! - tier-1 is always checked before tier-2; a tier-2 hit promotes into
//!   tier-1
//! - `set` replaces the whole record in both tiers; a tier-2 write failure
//!   never affects tier-1 success
//! - keys are direction-sensitive: A→B and B→A cache independently

use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::constants::cache as cache_config;
use crate::errors::ProviderError;
use crate::geo::LatLon;
use crate::geometry::parse_geometry;
use crate::routing::RoutingProvider;

mod disk;
mod memory;
pub mod types;

pub use disk::DiskTier;
pub use memory::MemoryTier;

use types::TimestampMillis;

/// Key for caching route geometry.
///
/// Derived from the routing profile plus the ordered `(lon, lat)` sequence
/// rounded to five decimal digits, so float jitter below ~1.1 m collides onto
/// the same key while the stop order (and therefore travel direction) stays
/// significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey(String);

impl RouteKey {
    /// Derives the key for an ordered stop sequence and routing profile.
    pub fn derive(stops: &[LatLon], profile: &str) -> Self {
        let mut key = String::with_capacity(profile.len() + stops.len() * 20);
        key.push_str(profile);
        key.push('|');
        for (i, stop) in stops.iter().enumerate() {
            if i > 0 {
                key.push(';');
            }
            let _ = write!(
                key,
                "{:.5},{:.5}",
                crate::geo::round_coordinate(stop.lon),
                crate::geo::round_coordinate(stop.lat)
            );
        }
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Road-snapped route geometry as stored in the cache.
///
/// `set` semantics are whole-record replace; fields are never updated
/// individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRoute {
    /// Route polyline, lat-first
    pub points: Vec<LatLon>,
    /// Total route length in kilometers
    pub distance_km: f64,
    /// When this record was created
    pub cached_at: TimestampMillis,
}

/// Statistics about cache performance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of entries evicted due to size limits
    pub evictions: u64,
    /// Number of entries expired due to TTL
    pub expirations: u64,
    /// Current number of entries
    pub entries: usize,
}

impl CacheStats {
    /// Cache hit rate as a percentage (0.0 to 100.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={}, misses={}, evictions={}, expirations={}, entries={}, hit_rate={:.1}%",
            self.hits,
            self.misses,
            self.evictions,
            self.expirations,
            self.entries,
            self.hit_rate()
        )
    }
}

/// Two-tier route geometry cache with a routing provider for prewarming.
pub struct RouteCache {
    memory: MemoryTier,
    disk: DiskTier,
    routing: Arc<dyn RoutingProvider>,
}

impl RouteCache {
    /// Creates a cache with default tier sizing and the given durable path.
    pub fn new(disk_path: impl Into<std::path::PathBuf>, routing: Arc<dyn RoutingProvider>) -> Self {
        Self {
            memory: MemoryTier::new().with_max_entries(cache_config::MEMORY_TIER_MAX_ENTRIES),
            disk: DiskTier::new(disk_path),
            routing,
        }
    }

    /// Creates a cache from explicitly configured tiers.
    pub fn with_tiers(memory: MemoryTier, disk: DiskTier, routing: Arc<dyn RoutingProvider>) -> Self {
        Self {
            memory,
            disk,
            routing,
        }
    }

    /// Looks up route geometry for an ordered stop sequence.
    ///
    /// Tier-1 first; on a miss, tier-2 with promotion. A corrupt or
    /// unreadable durable tier reads as a miss and never propagates.
    pub async fn get(&self, stops: &[LatLon], profile: &str) -> Option<CachedRoute> {
        let key = RouteKey::derive(stops, profile);

        if let Some(route) = self.memory.get(&key).await {
            return Some(route);
        }

        match self.disk.get(&key).await {
            Some(route) => {
                debug!(key = %key, "Promoting durable hit into memory tier");
                self.memory.insert(key, route.clone()).await;
                Some(route)
            }
            None => None,
        }
    }

    /// Stores route geometry in both tiers.
    ///
    /// The durable write is best-effort: quota or I/O failure is logged and
    /// the in-memory write stands.
    pub async fn set(&self, stops: &[LatLon], route: CachedRoute, profile: &str) {
        let key = RouteKey::derive(stops, profile);

        self.memory.insert(key.clone(), route.clone()).await;

        if let Err(e) = self.disk.insert(key, route).await {
            warn!(error = %e, "Durable tier write failed, continuing with memory only");
        }
    }

    /// Fetches and caches geometry for a stop sequence unless already cached.
    ///
    /// Idempotent: a cache hit is a no-op and repeated calls for identical
    /// stops perform at most one provider fetch (barring concurrent racers,
    /// whose results are identical anyway).
    pub async fn prewarm(&self, stops: &[LatLon], profile: &str) -> Result<(), ProviderError> {
        if self.get(stops, profile).await.is_some() {
            debug!(profile, stops = stops.len(), "Prewarm hit cache, nothing to do");
            return Ok(());
        }

        let plan = self.routing.fetch_route(stops, profile).await?;
        let (points, distance_km) = parse_geometry(&plan.geometry, plan.distance_meters);

        let route = CachedRoute {
            points,
            distance_km,
            cached_at: TimestampMillis::now(),
        };
        self.set(stops, route, profile).await;

        debug!(profile, stops = stops.len(), distance_km, "Prewarmed route");
        Ok(())
    }

    /// Prewarms in the background, capturing and logging any failure.
    ///
    /// Speculative callers use this instead of discarding a future: the
    /// failure channel exists, it just terminates in a log line.
    pub fn spawn_prewarm(
        self: &Arc<Self>,
        stops: Vec<LatLon>,
        profile: String,
    ) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = cache.prewarm(&stops, &profile).await {
                warn!(error = %e, profile = %profile, "Background route prewarm failed");
            }
        })
    }

    /// Statistics for the volatile tier.
    pub async fn memory_stats(&self) -> CacheStats {
        self.memory.stats().await
    }

    /// Statistics for the durable tier.
    pub async fn disk_stats(&self) -> CacheStats {
        self.disk.stats().await
    }
}
