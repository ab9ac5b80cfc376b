//! In-memory response cache
//!
//! Stores the last successful JSON response per cache key for the lifetime of
//! the cache. There is no expiry: an entry only changes when a newer
//! successful response for the same key overwrites it.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Result of reading from the cache
#[derive(Debug, Clone)]
pub struct CachedData {
    /// The stored response; clones of the `Arc` point at the same value
    pub data: Arc<Value>,
    /// When the response was stored
    pub cached_at: DateTime<Utc>,
}

/// Shared response cache
///
/// Cloning is cheap and every clone sees the same entries. Writes replace a
/// whole entry under the lock, so readers never observe a partial update.
/// Concurrent misses on one key may both fetch; the later write wins.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, CachedData>>>,
}

impl ResponseCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry stored under `key`, if any
    pub fn read(&self, key: &str) -> Option<CachedData> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    /// Stores `data` under `key`, replacing any previous entry
    ///
    /// Returns the shared handle that later reads will hand out.
    pub fn write(&self, key: impl Into<String>, data: impl Into<Arc<Value>>) -> Arc<Value> {
        let data = data.into();
        let entry = CachedData {
            data: Arc::clone(&data),
            cached_at: Utc::now(),
        };
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.into(), entry);
        data
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
