//! Shared test fixtures
//!
//! Scripted provider implementations with call counters, so suites can
//! assert how many external requests a code path performed without any
//! network access.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use routecast::{
    GeocodeCandidate, GeocodeProvider, LatLon, ProviderError, RoutePlan, RoutingProvider,
};

/// Geocoding provider answering from a scripted query → candidates table.
///
/// Unscripted queries return an empty candidate list; queries registered via
/// [`failing_on`](Self::failing_on) return a provider error instead.
#[derive(Default)]
pub struct ScriptedGeocoder {
    responses: HashMap<String, Vec<GeocodeCandidate>>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl ScriptedGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a single candidate for a query.
    pub fn with_place(self, query: &str, label: &str, lat: f64, lon: f64) -> Self {
        self.with_candidates(query, vec![candidate(label, lat, lon)])
    }

    /// Scripts a full candidate list for a query.
    pub fn with_candidates(mut self, query: &str, candidates: Vec<GeocodeCandidate>) -> Self {
        self.responses.insert(query.to_owned(), candidates);
        self
    }

    /// Makes a query fail with a provider error.
    pub fn failing_on(mut self, query: &str) -> Self {
        self.failing.insert(query.to_owned());
        self
    }

    /// Number of search calls performed so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeocodeProvider for ScriptedGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.contains(query) {
            return Err(ProviderError::status(500, "scripted failure"));
        }

        Ok(self.responses.get(query).cloned().unwrap_or_default())
    }
}

pub fn candidate(label: &str, lat: f64, lon: f64) -> GeocodeCandidate {
    GeocodeCandidate {
        label: label.to_owned(),
        position: LatLon::new(lat, lon),
    }
}

/// Routing provider returning one scripted plan for every request.
pub struct ScriptedRouter {
    plan: RoutePlan,
    no_route: bool,
    calls: AtomicUsize,
}

impl ScriptedRouter {
    /// Router answering with a short two-segment plan.
    pub fn new() -> Self {
        Self::with_plan(line_plan())
    }

    pub fn with_plan(plan: RoutePlan) -> Self {
        Self {
            plan,
            no_route: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Router that finds no route for any waypoints.
    pub fn unroutable() -> Self {
        Self {
            plan: line_plan(),
            no_route: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of fetch calls performed so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoutingProvider for ScriptedRouter {
    async fn fetch_route(
        &self,
        _waypoints: &[LatLon],
        _profile: &str,
    ) -> Result<RoutePlan, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.no_route {
            return Err(ProviderError::NoRoute);
        }

        Ok(self.plan.clone())
    }
}

/// A plausible short route: three points, lon-first, ~18.5 km.
pub fn line_plan() -> RoutePlan {
    RoutePlan {
        geometry: vec![[80.27, 13.08], [80.22, 13.03], [80.17, 12.99]],
        distance_meters: 18_500.0,
        duration_seconds: 2_200.0,
    }
}
