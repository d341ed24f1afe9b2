// SPDX-FileCopyrightText: 2026 routecast contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Volatile tier-1 route cache

use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use super::{CacheStats, CachedRoute, RouteKey};

/// Configuration for the memory tier
#[derive(Debug, Clone, Default)]
struct MemoryTierConfig {
    /// Maximum number of entries before eviction starts
    max_entries: Option<usize>,
}

/// Internal state for the memory tier
#[derive(Debug, Default)]
struct MemoryTierState {
    entries: HashMap<RouteKey, CachedRoute>,
    stats: CacheStats,
}

/// In-process route geometry store, scoped to the running process.
///
/// Entries never expire; the tier is bounded only by the optional entry cap,
/// which evicts the oldest entry by creation time. This is the first tier
/// consulted on every lookup, and the tier a durable hit is promoted into.
#[derive(Debug)]
pub struct MemoryTier {
    config: MemoryTierConfig,
    state: Mutex<MemoryTierState>,
}

impl MemoryTier {
    /// Creates an unbounded memory tier.
    pub fn new() -> Self {
        Self {
            config: MemoryTierConfig::default(),
            state: Mutex::new(MemoryTierState::default()),
        }
    }

    /// Sets the maximum number of entries.
    ///
    /// When the cap is reached the oldest entry (by `cached_at`) is evicted
    /// to make room.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.config.max_entries = Some(max_entries);
        self
    }

    /// Retrieves a cached route, if present.
    pub async fn get(&self, key: &RouteKey) -> Option<CachedRoute> {
        let mut state = self.state.lock().await;

        match state.entries.get(key).cloned() {
            Some(route) => {
                state.stats.hits += 1;
                debug!(key = %key, "Cache hit (memory)");
                Some(route)
            }
            None => {
                state.stats.misses += 1;
                debug!(key = %key, "Cache miss (memory)");
                None
            }
        }
    }

    /// Inserts a route, replacing any existing record for the key whole.
    pub async fn insert(&self, key: RouteKey, route: CachedRoute) {
        let mut state = self.state.lock().await;

        if let Some(max_entries) = self.config.max_entries {
            while state.entries.len() >= max_entries {
                if !Self::evict_oldest(&mut state) {
                    break;
                }
            }
        }

        debug!(key = %key, "Inserting entry into memory tier");
        state.entries.insert(key, route);
        state.stats.entries = state.entries.len();
    }

    /// Returns current statistics.
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        state.stats.clone()
    }

    fn evict_oldest(state: &mut MemoryTierState) -> bool {
        let oldest_key = state
            .entries
            .iter()
            .min_by_key(|(_, route)| route.cached_at)
            .map(|(key, _)| key.clone());

        match oldest_key {
            Some(key) => {
                debug!(key = %key, "Evicting oldest memory tier entry");
                state.entries.remove(&key);
                state.stats.evictions += 1;
                true
            }
            None => false,
        }
    }
}

impl Default for MemoryTier {
    fn default() -> Self {
        Self::new()
    }
}
