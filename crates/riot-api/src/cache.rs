//! Response cache keyed by endpoint and call arguments.
//!
//! Entries expire per endpoint TTL. Besides successful payloads the cache
//! stores definitive `NotFound` answers, so repeated lookups of an unknown
//! id do not spend rate-limit budget.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::time::Instant;

use crate::endpoint::Endpoint;
use crate::error::{ApiError, ApiResult};

/// Cache identity of a call. Arguments are kept in their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub endpoint: Endpoint,
    pub args: Vec<String>,
}

impl CacheKey {
    pub fn new(endpoint: Endpoint, args: &[String]) -> Self {
        Self {
            endpoint,
            args: args.to_vec(),
        }
    }
}

#[derive(Clone)]
struct CacheEntry {
    response: ApiResult<Value>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Whether a response may be served again within its TTL.
pub fn is_cacheable(response: &ApiResult<Value>) -> bool {
    matches!(response, Ok(_) | Err(ApiError::NotFound))
}

#[derive(Clone, Default)]
pub struct ResponseCache {
    entries: Arc<DashMap<CacheKey, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns None if not cached or expired.
    pub fn get(&self, key: &CacheKey) -> Option<ApiResult<Value>> {
        let entry = self.entries.get(key)?;

        if entry.is_expired() {
            drop(entry);
            self.entries.remove(key);
            return None;
        }

        Some(entry.response.clone())
    }

    /// Store a response for `ttl`. Responses that are not cacheable are ignored.
    pub fn insert(&self, key: CacheKey, response: &ApiResult<Value>, ttl: Duration) {
        if !is_cacheable(response) || ttl.is_zero() {
            return;
        }
        self.entries.insert(
            key,
            CacheEntry {
                response: response.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all expired entries, returning how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        let before = self.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        before - self.len()
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            entry_count: 0,
            expired_count: 0,
            not_found_count: 0,
        };
        for entry in self.entries.iter() {
            stats.entry_count += 1;
            if entry.is_expired() {
                stats.expired_count += 1;
            }
            if entry.response.is_err() {
                stats.not_found_count += 1;
            }
        }
        stats
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entry_count: usize,
    pub expired_count: usize,
    pub not_found_count: usize,
}
