//! Two-tier cache with per-entry expiry
//!
//! Provides a `CacheStore` that keeps JSON values in memory and mirrors them
//! into a `PersistentStore`, so entries survive restarts while repeated reads
//! stay off the disk.

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use super::store::{PersistentStore, StorageError};

/// Default time-to-live for cache entries in hours
pub const DEFAULT_TTL_HOURS: u64 = 24;

/// Wrapper stored in both layers
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    /// The cached value
    value: Value,
    /// First instant at which the entry is no longer readable
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Process-wide key/value cache backed by memory and a persistent store
///
/// Reads check memory first and promote persistent hits into memory.
/// Expired entries are evicted lazily from whichever layer they are found in.
/// Corrupt or unreadable entries behave exactly like misses.
#[derive(Debug)]
pub struct CacheStore {
    memory: Mutex<HashMap<String, CacheEntry>>,
    persistent: Arc<dyn PersistentStore>,
}

impl CacheStore {
    /// Creates a cache over the given persistent backend
    pub fn new(persistent: Arc<dyn PersistentStore>) -> Self {
        Self {
            memory: Mutex::new(HashMap::new()),
            persistent,
        }
    }

    /// Writes `value` to both layers, readable for `ttl_hours` from now
    ///
    /// The memory layer is always updated. An error means only the persistent
    /// write failed; the value is still served for the rest of the session.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl_hours: u64) -> Result<(), StorageError> {
        self.set_at(key, value, Duration::hours(ttl_hours as i64), Utc::now())
    }

    /// Reads a live value, or `None` on a miss, expiry or any storage failure
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, Utc::now())
    }

    pub(crate) fn set_at<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let entry = CacheEntry {
            value: serde_json::to_value(value)?,
            expires_at: now + ttl,
        };

        let serialized = serde_json::to_string(&entry)?;
        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(key.to_string(), entry);
        }

        self.persistent.set(key, &serialized)
    }

    pub(crate) fn get_at<T: DeserializeOwned>(&self, key: &str, now: DateTime<Utc>) -> Option<T> {
        let value = match self.lookup(key, now) {
            Ok(value) => value?,
            Err(e) => {
                warn!(key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_value(value) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(key, error = %e, "cached value has unexpected shape, treating as miss");
                None
            }
        }
    }

    fn lookup(&self, key: &str, now: DateTime<Utc>) -> Result<Option<Value>, StorageError> {
        if let Ok(mut memory) = self.memory.lock() {
            match memory.get(key) {
                Some(entry) if entry.is_live(now) => {
                    debug!(key, "memory cache hit");
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {
                    debug!(key, "memory cache entry expired");
                    memory.remove(key);
                }
                None => {}
            }
        }

        let Some(raw) = self.persistent.get(key)? else {
            debug!(key, "cache miss");
            return Ok(None);
        };
        let entry: CacheEntry = serde_json::from_str(&raw)?;

        if !entry.is_live(now) {
            debug!(key, "persistent cache entry expired");
            self.persistent.remove(key)?;
            return Ok(None);
        }

        debug!(key, "persistent cache hit, promoting to memory");
        let value = entry.value.clone();
        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(key.to_string(), entry);
        }
        Ok(Some(value))
    }

    /// Drops every in-memory entry, leaving the persistent layer untouched
    #[cfg(test)]
    fn clear_memory(&self) {
        if let Ok(mut memory) = self.memory.lock() {
            memory.clear();
        }
    }
}
