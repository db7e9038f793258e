//! In-process TTL cache for read queries.
//!
//! Values are stored as JSON so the cache can hold any serializable query
//! result and report its keys. There is no size bound and no LRU; entries leave
//! only through [`QueryCache::clear`] or [`QueryCache::purge_expired`].
//!
//! Concurrent misses on the same key are not coalesced: every caller that
//! misses runs its producer once and the last write wins.

use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::CacheConfig;

struct CacheEntry {
    value: serde_json::Value,
    cached_at: Instant,
    ttl: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

pub struct QueryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
    slow_query_threshold: Duration,
}

impl QueryCache {
    #[must_use]
    pub fn new(default_ttl: Duration, slow_query_threshold: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
            slow_query_threshold,
        }
    }

    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            Duration::from_secs(config.default_ttl_seconds),
            Duration::from_millis(config.slow_query_ms),
        )
    }

    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the cached value for `key` when it is younger than `ttl`,
    /// otherwise runs `producer`, stores its result and returns it.
    ///
    /// Producer errors are passed through and never cached.
    pub async fn optimize_query<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        producer: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.fresh_value(key, ttl).await {
            match serde_json::from_value::<T>(value) {
                Ok(hit) => {
                    metrics::counter!("query_cache_hits_total").increment(1);
                    debug!(key, "Query cache hit");
                    return Ok(hit);
                }
                Err(e) => warn!(key, error = %e, "Cached value has unexpected shape, refreshing"),
            }
        }

        metrics::counter!("query_cache_misses_total").increment(1);

        let started = Instant::now();
        let fresh = producer().await?;
        let elapsed = started.elapsed();

        if elapsed > self.slow_query_threshold {
            warn!(
                key,
                duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                "Slow query"
            );
        }

        match serde_json::to_value(&fresh) {
            Ok(value) => {
                self.entries.write().await.insert(
                    key.to_string(),
                    CacheEntry {
                        value,
                        cached_at: Instant::now(),
                        ttl,
                    },
                );
            }
            Err(e) => warn!(key, error = %e, "Query result is not cacheable"),
        }

        Ok(fresh)
    }

    async fn fresh_value(&self, key: &str, ttl: Duration) -> Option<serde_json::Value> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.cached_at.elapsed() < ttl)
            .map(|entry| entry.value.clone())
    }

    /// Removes every entry, or only those whose key contains `pattern`.
    /// Returns the number of removed entries.
    pub async fn clear(&self, pattern: Option<&str>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();

        match pattern {
            Some(pattern) => entries.retain(|key, _| !key.contains(pattern)),
            None => entries.clear(),
        }

        let removed = before - entries.len();
        debug!(pattern, removed, "Query cache cleared");
        removed
    }

    /// Removes exactly `key`, unlike [`QueryCache::clear`] which matches substrings.
    pub async fn remove(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Drops entries older than the TTL they were written with.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.cached_at.elapsed() < entry.ttl);
        before - entries.len()
    }

    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();

        CacheStats {
            size: entries.len(),
            keys,
        }
    }
}
