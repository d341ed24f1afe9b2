// SPDX-FileCopyrightText: 2026 routecast contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Durable tier-2 route cache

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{CacheStats, CachedRoute, RouteKey};
use crate::errors::CacheError;

/// Current on-disk document version
const DOCUMENT_VERSION: u32 = 1;

/// Serialized cache document (versioned)
///
/// Keys are the route key's string form, which round-trips through JSON
/// without custom serde.
#[derive(Debug, Serialize, Deserialize)]
struct CacheDocument {
    version: u32,
    entries: HashMap<String, CachedRoute>,
}

impl Default for CacheDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// Configuration for the disk tier
#[derive(Debug, Clone, Default)]
struct DiskTierConfig {
    max_entries: Option<usize>,
}

/// Durable route geometry store backed by a JSON file.
///
/// Every quality of this tier is best-effort:
///
/// - a missing, unreadable, or corrupt file reads as an empty cache
/// - write failures are reported to the caller, who logs and moves on
/// - writes are atomic (temp file + rename) under an exclusive advisory lock
///
/// The file outlives the process, so geometry fetched in one session is
/// served from disk in the next.
#[derive(Debug)]
pub struct DiskTier {
    path: PathBuf,
    config: DiskTierConfig,
    stats: Mutex<CacheStats>,
}

impl DiskTier {
    /// Creates a disk tier at the specified path.
    ///
    /// The file is created on first insert; path validation is deferred to
    /// the first I/O operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: DiskTierConfig::default(),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// Sets the maximum number of entries.
    ///
    /// When the cap is exceeded the oldest entries (by creation time) are
    /// evicted before writing.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.config.max_entries = Some(max_entries);
        self
    }

    /// Retrieves a cached route, treating every failure as a miss.
    pub async fn get(&self, key: &RouteKey) -> Option<CachedRoute> {
        let mut stats = self.stats.lock().await;
        let document = self.load();

        match document.entries.get(key.as_str()).cloned() {
            Some(route) => {
                stats.hits += 1;
                debug!(key = %key, "Cache hit (disk)");
                Some(route)
            }
            None => {
                stats.misses += 1;
                debug!(key = %key, "Cache miss (disk)");
                None
            }
        }
    }

    /// Inserts a route, persisting the whole document.
    pub async fn insert(&self, key: RouteKey, route: CachedRoute) -> Result<(), CacheError> {
        let mut stats = self.stats.lock().await;
        let mut document = self.load();

        debug!(key = %key, "Inserting entry into disk tier");
        document.entries.insert(key.as_str().to_owned(), route);

        if let Some(max_entries) = self.config.max_entries {
            let evicted = Self::evict_oldest(&mut document, max_entries);
            stats.evictions += evicted as u64;
        }

        stats.entries = document.entries.len();
        self.save(&document).await
    }

    /// Returns current statistics.
    pub async fn stats(&self) -> CacheStats {
        let mut stats = self.stats.lock().await;
        stats.entries = self.load().entries.len();
        stats.clone()
    }

    /// Loads the cache document, degrading every failure to an empty cache.
    fn load(&self) -> CacheDocument {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Cache file does not exist, using empty cache");
            return CacheDocument::default();
        }

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to open cache file, using empty cache");
                return CacheDocument::default();
            }
        };

        if let Err(e) = file.lock_shared() {
            warn!(path = %self.path.display(), error = %e, "Failed to lock cache file, using empty cache");
            return CacheDocument::default();
        }

        let document: CacheDocument = match serde_json::from_reader(&file) {
            Ok(document) => document,
            Err(e) => {
                // Corrupt entries are a miss, never an error.
                warn!(path = %self.path.display(), error = %e, "Failed to parse cache file, using empty cache");
                return CacheDocument::default();
            }
        };

        if document.version != DOCUMENT_VERSION {
            warn!(
                path = %self.path.display(),
                cached_version = document.version,
                current_version = DOCUMENT_VERSION,
                "Cache version mismatch, ignoring cached data"
            );
            return CacheDocument::default();
        }

        document
    }

    /// Saves the cache document atomically via a temp file.
    async fn save(&self, document: &CacheDocument) -> Result<(), CacheError> {
        let json = serde_json::to_vec(document)
            .map_err(|e| CacheError::serialization_error("encoding cache document", e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    CacheError::io_error(
                        parent.display().to_string(),
                        "Failed to create cache directory",
                        Some(e),
                    )
                })?;
            }
        }

        let temp_path = self.path.with_extension("tmp");

        tokio::fs::write(&temp_path, &json).await.map_err(|e| {
            CacheError::io_error(
                temp_path.display().to_string(),
                "Failed to write cache file",
                Some(e),
            )
        })?;

        let file = File::open(&temp_path).map_err(|e| {
            CacheError::io_error(
                temp_path.display().to_string(),
                "Failed to open temp cache file",
                Some(e),
            )
        })?;

        file.lock().map_err(|e| {
            CacheError::io_error(
                temp_path.display().to_string(),
                "Failed to lock cache file",
                Some(e),
            )
        })?;

        tokio::fs::rename(&temp_path, &self.path).await.map_err(|e| {
            CacheError::io_error(
                self.path.display().to_string(),
                "Failed to move cache file into place",
                Some(e),
            )
        })?;

        drop(file);

        debug!(
            path = %self.path.display(),
            entries = document.entries.len(),
            "Saved route cache"
        );

        Ok(())
    }

    fn evict_oldest(document: &mut CacheDocument, max_entries: usize) -> usize {
        let mut evicted = 0;

        while document.entries.len() > max_entries {
            let oldest_key = document
                .entries
                .iter()
                .min_by_key(|(_, route)| route.cached_at)
                .map(|(key, _)| key.clone());

            match oldest_key {
                Some(key) => {
                    debug!(key = %key, "Evicting oldest disk tier entry");
                    document.entries.remove(&key);
                    evicted += 1;
                }
                None => break,
            }
        }

        evicted
    }
}
