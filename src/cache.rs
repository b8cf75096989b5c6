use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Namespace prefix for every key this library writes. `clear_all` removes
/// exactly the keys carrying it; foreign keys in the same file are left alone.
pub const CACHE_PREFIX: &str = "ads_dashboard_cache_";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    data: Value,
    timestamp: i64,
}

/// File-backed TTL key-value cache for API responses.
///
/// Callers encode every dimension that affects payload correctness into the
/// logical key (account id, date-range length, data-type discriminator) so
/// distinct queries never collide. The max age is supplied per read, not
/// fixed at write time.
///
/// Every failure path is fail-open: a broken or unwritable cache behaves as
/// "always miss" and never blocks the data path.
pub struct MetricsCache {
    path: PathBuf,
    entries: BTreeMap<String, CacheEntry>,
}

impl MetricsCache {
    /// Opens the cache at `path`. Never fails: a missing, unreadable, or
    /// corrupt file yields an empty cache.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        Self { path, entries }
    }

    /// Stores `data` under the namespaced key with the current timestamp.
    /// Serialization or I/O failures are logged and swallowed.
    pub fn write<T: Serialize>(&mut self, key: &str, data: &T) {
        self.write_at(key, data, now_ms());
    }

    pub fn write_at<T: Serialize>(&mut self, key: &str, data: &T, now_ms: i64) {
        let data = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(err) => {
                warn!("cache write skipped for {key}: {err}");
                return;
            }
        };
        self.entries.insert(
            storage_key(key),
            CacheEntry {
                data,
                timestamp: now_ms,
            },
        );
        self.persist();
    }

    /// Returns the stored payload while it is younger than `max_age_minutes`.
    /// An expired entry is removed; a payload that no longer parses is
    /// treated as missing. Never errors.
    pub fn read<T: DeserializeOwned>(&mut self, key: &str, max_age_minutes: i64) -> Option<T> {
        self.read_at(key, max_age_minutes, now_ms())
    }

    pub fn read_at<T: DeserializeOwned>(
        &mut self,
        key: &str,
        max_age_minutes: i64,
        now_ms: i64,
    ) -> Option<T> {
        let storage_key = storage_key(key);
        let entry = self.entries.get(&storage_key)?;
        if now_ms - entry.timestamp > max_age_minutes * 60_000 {
            self.entries.remove(&storage_key);
            self.persist();
            return None;
        }
        match serde_json::from_value(entry.data.clone()) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("cache entry for {key} no longer parses: {err}");
                None
            }
        }
    }

    /// Age predicate only; does not purge.
    pub fn is_expired(&self, key: &str, max_age_minutes: i64) -> bool {
        self.is_expired_at(key, max_age_minutes, now_ms())
    }

    pub fn is_expired_at(&self, key: &str, max_age_minutes: i64, now_ms: i64) -> bool {
        match self.entries.get(&storage_key(key)) {
            Some(entry) => now_ms - entry.timestamp > max_age_minutes * 60_000,
            None => true,
        }
    }

    /// Removes every entry under the namespace prefix. Keys without the
    /// prefix (written by other tooling into the same file) survive.
    pub fn clear_all(&mut self) {
        self.entries.retain(|key, _| !key.starts_with(CACHE_PREFIX));
        self.persist();
    }

    fn persist(&self) {
        let payload = match serde_json::to_vec_pretty(&self.entries) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("failed to serialize cache file: {err}");
                return;
            }
        };
        if let Err(err) = fs::write(&self.path, payload) {
            warn!("failed to write cache file {}: {err}", self.path.display());
        }
    }
}

fn storage_key(key: &str) -> String {
    format!("{CACHE_PREFIX}{key}")
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn load_entries(path: &Path) -> BTreeMap<String, CacheEntry> {
    match fs::read(path) {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("failed to parse cache file {}: {err}", path.display());
                BTreeMap::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(err) => {
            warn!("failed to read cache file {}: {err}", path.display());
            BTreeMap::new()
        }
    }
}
