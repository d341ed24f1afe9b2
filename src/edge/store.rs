// SPDX-FileCopyrightText: 2026 routecast contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Durable stores backing the edge resolver
//!
//! Two JSON-file stores with the same mechanics as the route cache's disk
//! tier (versioned document, advisory locks, atomic rename, corrupt file
//! reads as empty):
//!
//! - [`KvStore`]: key → JSON value with absolute millisecond expiry
//! - [`StopListStore`]: bus records (id, name, ordered stop list)
//!
//! Both offer single-key get/set only; concurrent writers to one key race
//! last-writer-wins, which is acceptable because stored values are
//! deterministic functions of identical inputs.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::types::TimestampMillis;
use crate::cache::CacheStats;
use crate::errors::CacheError;

const KV_DOCUMENT_VERSION: u32 = 1;
const STOP_DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KvEntry {
    value: serde_json::Value,
    expires_at: TimestampMillis,
}

#[derive(Debug, Serialize, Deserialize)]
struct KvDocument {
    version: u32,
    entries: HashMap<String, KvEntry>,
}

impl Default for KvDocument {
    fn default() -> Self {
        Self {
            version: KV_DOCUMENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// Durable key→JSON store with absolute expiry.
///
/// An entry past its expiry is a miss even on key match; expired entries are
/// pruned on the next write.
#[derive(Debug)]
pub struct KvStore {
    path: PathBuf,
    stats: Mutex<CacheStats>,
}

impl KvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// Retrieves and decodes a live value, treating every failure as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut stats = self.stats.lock().await;
        let document = load_document::<KvDocument>(&self.path, KV_DOCUMENT_VERSION);

        let entry = match document.entries.get(key) {
            Some(entry) => entry,
            None => {
                stats.misses += 1;
                debug!(key, "KV miss");
                return None;
            }
        };

        if entry.expires_at.is_past() {
            stats.expirations += 1;
            stats.misses += 1;
            debug!(key, "KV entry expired");
            return None;
        }

        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => {
                stats.hits += 1;
                debug!(key, "KV hit");
                Some(value)
            }
            Err(e) => {
                stats.misses += 1;
                warn!(key, error = %e, "KV entry failed to decode, treating as miss");
                None
            }
        }
    }

    /// Stores a value that expires `ttl` from now.
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut stats = self.stats.lock().await;
        let mut document = load_document::<KvDocument>(&self.path, KV_DOCUMENT_VERSION);

        let encoded = serde_json::to_value(value)
            .map_err(|e| CacheError::serialization_error("encoding KV value", e))?;

        document.entries.retain(|pruned_key, entry| {
            let live = !entry.expires_at.is_past();
            if !live {
                debug!(key = %pruned_key, "Pruning expired KV entry");
            }
            live
        });

        debug!(key, "KV set");
        document.entries.insert(
            key.to_owned(),
            KvEntry {
                value: encoded,
                expires_at: TimestampMillis::now().plus(ttl),
            },
        );
        stats.entries = document.entries.len();

        save_document(&self.path, &document).await
    }

    /// Returns current statistics.
    pub async fn stats(&self) -> CacheStats {
        let stats = self.stats.lock().await;
        stats.clone()
    }
}

/// A tracked bus: identity plus its ordered stop list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusRecord {
    pub id: String,
    pub name: String,
    pub stops: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StopDocument {
    version: u32,
    buses: HashMap<String, BusRecord>,
}

impl Default for StopDocument {
    fn default() -> Self {
        Self {
            version: STOP_DOCUMENT_VERSION,
            buses: HashMap::new(),
        }
    }
}

/// Durable record store of stop lists, looked up by bus id or name.
#[derive(Debug)]
pub struct StopListStore {
    path: PathBuf,
}

impl StopListStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Finds a record by id, falling back to a case-insensitive name match.
    pub async fn find(&self, reference: &str) -> Option<BusRecord> {
        let document = load_document::<StopDocument>(&self.path, STOP_DOCUMENT_VERSION);

        if let Some(record) = document.buses.get(reference) {
            return Some(record.clone());
        }

        document
            .buses
            .values()
            .find(|record| record.name.eq_ignore_ascii_case(reference))
            .cloned()
    }

    /// Inserts or replaces a record, keyed by its id.
    pub async fn upsert(&self, record: BusRecord) -> Result<(), CacheError> {
        let mut document = load_document::<StopDocument>(&self.path, STOP_DOCUMENT_VERSION);
        document.buses.insert(record.id.clone(), record);
        save_document(&self.path, &document).await
    }
}

/// Loads a versioned document, degrading every failure to the default.
fn load_document<D: DeserializeOwned + Default + VersionedDocument>(
    path: &std::path::Path,
    expected_version: u32,
) -> D {
    if !path.exists() {
        return D::default();
    }

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to open store file, using empty store");
            return D::default();
        }
    };

    if let Err(e) = file.lock_shared() {
        warn!(path = %path.display(), error = %e, "Failed to lock store file, using empty store");
        return D::default();
    }

    let document: D = match serde_json::from_reader(&file) {
        Ok(document) => document,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to parse store file, using empty store");
            return D::default();
        }
    };

    if document.version() != expected_version {
        warn!(
            path = %path.display(),
            stored_version = document.version(),
            expected_version,
            "Store version mismatch, ignoring stored data"
        );
        return D::default();
    }

    document
}

/// Saves a document atomically via a temp file under an exclusive lock.
async fn save_document<D: Serialize>(
    path: &std::path::Path,
    document: &D,
) -> Result<(), CacheError> {
    let json = serde_json::to_vec(document)
        .map_err(|e| CacheError::serialization_error("encoding store document", e))?;

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                CacheError::io_error(
                    parent.display().to_string(),
                    "Failed to create store directory",
                    Some(e),
                )
            })?;
        }
    }

    let temp_path = path.with_extension("tmp");

    tokio::fs::write(&temp_path, &json).await.map_err(|e| {
        CacheError::io_error(
            temp_path.display().to_string(),
            "Failed to write store file",
            Some(e),
        )
    })?;

    let file = File::open(&temp_path).map_err(|e| {
        CacheError::io_error(
            temp_path.display().to_string(),
            "Failed to open temp store file",
            Some(e),
        )
    })?;

    file.lock().map_err(|e| {
        CacheError::io_error(
            temp_path.display().to_string(),
            "Failed to lock store file",
            Some(e),
        )
    })?;

    tokio::fs::rename(&temp_path, path).await.map_err(|e| {
        CacheError::io_error(
            path.display().to_string(),
            "Failed to move store file into place",
            Some(e),
        )
    })?;

    drop(file);
    Ok(())
}

/// Version accessor shared by the on-disk document types.
trait VersionedDocument {
    fn version(&self) -> u32;
}

impl VersionedDocument for KvDocument {
    fn version(&self) -> u32 {
        self.version
    }
}

impl VersionedDocument for StopDocument {
    fn version(&self) -> u32 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Payload {
        label: String,
        count: u32,
    }

    fn payload() -> Payload {
        Payload {
            label: "route".to_owned(),
            count: 3,
        }
    }

    #[tokio::test]
    async fn kv_set_then_get_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = KvStore::new(dir.path().join("kv.json"));

        assert!(store.get::<Payload>("k").await.is_none());

        store
            .set("k", &payload(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get::<Payload>("k").await, Some(payload()));
    }

    #[tokio::test]
    async fn kv_expired_entry_is_a_miss_on_key_match() {
        let dir = TempDir::new().unwrap();
        let store = KvStore::new(dir.path().join("kv.json"));

        store
            .set("k", &payload(), Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(store.get::<Payload>("k").await.is_none());
        let stats = store.stats().await;
        assert_eq!(stats.expirations, 1);
    }

    #[tokio::test]
    async fn kv_write_prunes_expired_entries() {
        let dir = TempDir::new().unwrap();
        let store = KvStore::new(dir.path().join("kv.json"));

        store
            .set("short", &payload(), Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        store
            .set("long", &payload(), Duration::from_secs(60))
            .await
            .unwrap();

        let stats = store.stats().await;
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn kv_survives_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kv.json");

        {
            let store = KvStore::new(&path);
            store
                .set("k", &payload(), Duration::from_secs(60))
                .await
                .unwrap();
        }

        let store = KvStore::new(&path);
        assert_eq!(store.get::<Payload>("k").await, Some(payload()));
    }

    #[tokio::test]
    async fn kv_corrupt_file_reads_as_miss() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kv.json");
        std::fs::write(&path, b"]]garbage").unwrap();

        let store = KvStore::new(&path);
        assert!(store.get::<Payload>("k").await.is_none());
    }

    fn record(id: &str, name: &str) -> BusRecord {
        BusRecord {
            id: id.to_owned(),
            name: name.to_owned(),
            stops: vec!["Tambaram".to_owned(), "Guindy".to_owned()],
        }
    }

    #[tokio::test]
    async fn stop_list_find_by_id_and_name() {
        let dir = TempDir::new().unwrap();
        let store = StopListStore::new(dir.path().join("buses.json"));

        store.upsert(record("bus-7", "Route 7 Express")).await.unwrap();

        assert!(store.find("bus-7").await.is_some());
        assert!(store.find("route 7 express").await.is_some());
        assert!(store.find("bus-8").await.is_none());
    }
}
