//! Stop-name geocoding with anchor-based disambiguation
//!
//! Human-entered stop names are ambiguous: the same settlement name appears
//! in several districts, and provider ranking alone picks the wrong one often
//! enough to matter. The [`GeocodeResolver`] layers three mechanisms over a
//! pluggable [`GeocodeProvider`]:
//!
//! 1. **Session cache** - results (including failures) are cached by
//!    normalized name for the resolver's lifetime and never retried.
//! 2. **Progressive query variants** - a fixed, progressively-less-specific
//!    query sequence; the first variant returning any candidate wins.
//! 3. **Anchor heuristic** - once one stop on a route is resolved, later
//!    ambiguous names prefer the candidate nearest that anchor.
//!
//! Geocoding failure is an expected outcome, not an error: exhausting every
//! variant yields `None`.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::constants::limits;
use crate::errors::ProviderError;
use crate::geo::{haversine_km, LatLon};
use crate::limiter::RateLimiter;

mod nominatim;

pub use nominatim::NominatimClient;

/// A single candidate returned by a geocoding provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeCandidate {
    /// Provider's canonical name for the place
    pub label: String,
    /// Candidate position
    pub position: LatLon,
}

/// Trait for geocoding providers.
///
/// Implementations translate one free-text query into ranked candidates.
/// Query shaping, retries, caching, and disambiguation all live in the
/// resolver, so providers stay thin.
#[async_trait::async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Searches for candidates matching `query`, best-ranked first.
    async fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, ProviderError>;
}

/// A resolved stop: the provider's corrected name plus its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    /// Canonical place name as corrected by the provider
    pub corrected_name: String,
    /// Resolved position
    pub position: LatLon,
}

/// Resolves stop names to coordinates with caching and disambiguation.
///
/// Each resolver owns its session cache and rate limiter; the edge resolver
/// and client tier construct independent instances.
pub struct GeocodeResolver {
    provider: Arc<dyn GeocodeProvider>,
    limiter: RateLimiter,
    /// Session cache keyed by normalized name; absent results are cached too.
    cache: Mutex<HashMap<String, Option<GeocodeResult>>>,
}

impl GeocodeResolver {
    /// Creates a resolver with the default inter-request delay.
    pub fn new(provider: Arc<dyn GeocodeProvider>) -> Self {
        Self {
            provider,
            limiter: RateLimiter::with_min_delay(limits::GEOCODE_MIN_DELAY),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the rate limiter.
    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Resolves one stop name, preferring candidates near `anchor`.
    ///
    /// Cache-first by normalized name; on a miss each query variant is tried
    /// in order behind the rate limiter, and a variant's provider failure is
    /// swallowed in favor of the next. The outcome - present or absent - is
    /// cached for the session and never retried.
    pub async fn resolve(&self, name: &str, anchor: Option<LatLon>) -> Option<GeocodeResult> {
        let normalized = normalize(name);

        if let Some(cached) = self.cache.lock().await.get(&normalized) {
            debug!(name = %normalized, "Geocode cache hit");
            return cached.clone();
        }

        let mut outcome = None;
        for query in query_variants(name.trim()) {
            self.limiter.acquire().await;

            match self.provider.search(&query).await {
                Ok(candidates) => match select_candidate(candidates, anchor) {
                    Some(chosen) => {
                        debug!(name = %normalized, corrected = %chosen.label, "Geocode resolved");
                        outcome = Some(GeocodeResult {
                            corrected_name: chosen.label,
                            position: chosen.position,
                        });
                        break;
                    }
                    None => {
                        debug!(query = %query, "No geocode candidates, trying next variant");
                    }
                },
                Err(e) => {
                    warn!(query = %query, error = %e, "Geocode query failed, trying next variant");
                }
            }
        }

        if outcome.is_none() {
            debug!(name = %normalized, "Geocoding exhausted all query variants");
        }

        self.cache
            .lock()
            .await
            .insert(normalized, outcome.clone());
        outcome
    }

    /// Resolves an ordered stop-name sequence.
    ///
    /// The anchor is set once, from the first successfully resolved stop, and
    /// held fixed for the rest of the sequence. On long routes the fixed
    /// anchor limits disambiguation accuracy for far-away stops; the
    /// trade-off is determinism, and the behavior is deliberate.
    pub async fn resolve_sequence(&self, names: &[String]) -> Vec<Option<GeocodeResult>> {
        let mut anchor: Option<LatLon> = None;
        let mut results = Vec::with_capacity(names.len());

        for name in names {
            let resolved = self.resolve(name, anchor).await;
            if anchor.is_none() {
                if let Some(result) = &resolved {
                    anchor = Some(result.position);
                }
            }
            results.push(resolved);
        }

        results
    }
}

/// Normalized session-cache key: trimmed, lower-cased.
fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Fixed, progressively-less-specific query sequence for a stop name.
fn query_variants(name: &str) -> [String; 3] {
    [
        format!("{name} bus stop"),
        format!("{name} bus stand"),
        name.to_owned(),
    ]
}

/// Applies the anchor heuristic to a candidate list.
///
/// With an anchor and more than one candidate, picks the candidate with the
/// smallest great-circle distance to the anchor; otherwise the provider's
/// top-ranked candidate stands. `None` only for an empty list.
fn select_candidate(
    candidates: Vec<GeocodeCandidate>,
    anchor: Option<LatLon>,
) -> Option<GeocodeCandidate> {
    match anchor {
        Some(anchor) if candidates.len() > 1 => candidates.into_iter().min_by(|a, b| {
            haversine_km(a.position, anchor).total_cmp(&haversine_km(b.position, anchor))
        }),
        _ => candidates.into_iter().next(),
    }
}
