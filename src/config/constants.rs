//! Well-known endpoints and tuning constants
//!
//! This module centralizes magic constants used throughout the routecast
//! crate, improving discoverability and maintainability.

use std::time::Duration;

/// External provider endpoints and identification
pub mod providers {
    /// Public Nominatim search endpoint.
    ///
    /// Override per deployment via `ROUTECAST_NOMINATIM_URL`; Nominatim's
    /// usage policy requires an identifying User-Agent on every request.
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

    /// Public OSRM routing endpoint (profile appended per request).
    pub const OSRM_URL: &str = "https://router.project-osrm.org";

    /// Identifying User-Agent sent to both providers.
    pub const USER_AGENT: &str = concat!("routecast/", env!("CARGO_PKG_VERSION"));

    /// Country filter applied to geocoding queries.
    pub const GEOCODE_COUNTRY_CODES: &str = "in";

    /// Maximum candidates requested per geocoding query.
    pub const GEOCODE_CANDIDATE_LIMIT: u32 = 3;
}

/// Rate limiting and pacing
pub mod limits {
    use super::Duration;

    /// Minimum delay between consecutive geocoding requests.
    ///
    /// Nominatim's public instance allows at most one request per second;
    /// the first query of a sequence is immediate, every later one waits.
    pub const GEOCODE_MIN_DELAY: Duration = Duration::from_millis(1100);
}

/// Cache sizing and expiry
pub mod cache {
    use super::Duration;

    /// Decimal digits kept when rounding coordinates into route keys.
    ///
    /// Five digits is ~1.1 m, the trade-off between hit rate and treating
    /// genuinely different stops as identical.
    pub const ROUTE_KEY_PRECISION: u32 = 5;

    /// Absolute TTL for consolidated edge cache entries.
    pub const EDGE_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

    /// Default cap on tier-1 route cache entries.
    pub const MEMORY_TIER_MAX_ENTRIES: usize = 256;
}

/// Geometry processing thresholds
pub mod geometry {
    /// Maximum number of direction-arrow samples per route.
    pub const MAX_ARROW_SAMPLES: usize = 8;

    /// Default minimum movement before a GPS fix is kept, in meters.
    pub const GPS_MIN_DISTANCE_METERS: f64 = 20.0;
}

/// Marker motion smoothing
pub mod motion {
    use super::Duration;

    /// Default animation duration between position fixes.
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(2800);

    /// Default frame interval (~60 fps).
    pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

    /// Default track identifier when the caller does not name one.
    pub const DEFAULT_TRACK: &str = "bus";
}
