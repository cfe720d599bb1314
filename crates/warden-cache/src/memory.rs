//! In-process cache backend.
//!
//! Expiry is checked lazily when a key is read. An expired entry that is never
//! read again stays in memory until it is overwritten, deleted, dropped by a
//! namespace delete, or removed by [`MemoryCache::purge_expired`]. Long-running
//! processes that write many distinct keys can opt into
//! [`MemoryCache::spawn_sweeper`] to bound that growth.

use crate::backend::CacheBackend;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use warden_core::WardenResult;

// Roughly thirty years; used when `now + ttl` would overflow.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(value: Value, ttl: Duration) -> Self {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + FAR_FUTURE);
        Self { value, expires_at }
    }

    fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Process-local cache over a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet removed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    /// Drops every entry, expired or not.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        info!("Clearing {} cache entries", entries.len());
        entries.clear();
    }

    /// Spawns a task that calls [`purge_expired`](Self::purge_expired) every
    /// `interval`.
    ///
    /// Abort the returned handle on shutdown.
    pub fn spawn_sweeper(cache: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Starting cache sweeper with interval of {:?}", interval);

            loop {
                tokio::time::sleep(interval).await;

                let removed = cache.purge_expired();
                if removed > 0 {
                    info!("Cache sweep removed {} expired entries", removed);
                } else {
                    debug!("Cache sweep found no expired entries");
                }
            }
        })
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> WardenResult<Option<Value>> {
        let mut entries = self.entries.lock();

        match entries.get(key) {
            None => {
                debug!(key, "cache miss");
                return Ok(None);
            }
            Some(entry) if !entry.is_expired_at(Instant::now()) => {
                debug!(key, "cache hit");
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => {}
        }

        entries.remove(key);
        debug!(key, "cache entry expired");
        Ok(None)
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> WardenResult<()> {
        self.entries
            .lock()
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        debug!(key, ttl_secs = ttl.as_secs(), "cache set");
        Ok(())
    }

    async fn delete(&self, key: &str) -> WardenResult<()> {
        let existed = self.entries.lock().remove(key).is_some();
        debug!(key, existed, "cache delete");
        Ok(())
    }

    async fn delete_namespace(&self, prefix: &str) -> WardenResult<u64> {
        let mut entries = self.entries.lock();
        let doomed: Vec<String> = entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();

        for key in &doomed {
            entries.remove(key);
        }

        debug!(prefix, removed = doomed.len(), "cache namespace deleted");
        Ok(doomed.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_clear_drops_everything() {
        let cache = MemoryCache::new();
        cache.set("user:1", json!(1), MINUTE).await.unwrap();
        cache.set("users::limit:10:offset:1", json!([]), MINUTE).await.unwrap();

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.get("user:1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCache::new();
        cache.set("user:1", json!({"id": 1}), MINUTE).await.unwrap();
        assert_eq!(cache.get("user:1").await.unwrap(), Some(json!({"id": 1})));
    }

    #[tokio::test]
    async fn test_missing_key_is_absent() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let cache = MemoryCache::new();
        cache.set("k", json!(1), MINUTE).await.unwrap();
        cache.set("k", json!(2), MINUTE).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let cache = MemoryCache::new();
        cache.set("k", json!(1), MINUTE).await.unwrap();
        cache.delete("k").await.unwrap();
        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_zero_ttl_is_immediately_absent() {
        let cache = MemoryCache::new();
        cache.set("k", json!(1), Duration::ZERO).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_boundary_is_exclusive() {
        let cache = MemoryCache::new();
        cache.set("k", json!(1), Duration::from_secs(10)).await.unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(cache.get("k").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get("k").await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_linger_until_read() {
        let cache = MemoryCache::new();
        cache.set("a", json!(1), Duration::from_secs(1)).await.unwrap();
        cache.set("b", json!(2), Duration::from_secs(1)).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.len(), 2);

        cache.get("a").await.unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_namespace_delete_matches_literal_prefix() {
        let cache = MemoryCache::new();
        cache.set("users:email:a@x.com:limit:10:offset:1", json!([]), MINUTE).await.unwrap();
        cache.set("users::limit:10:offset:1", json!([]), MINUTE).await.unwrap();
        cache.set("user:5", json!({"id": 5}), MINUTE).await.unwrap();

        let removed = cache.delete_namespace("users").await.unwrap();

        assert_eq!(removed, 2);
        assert!(cache.get("users::limit:10:offset:1").await.unwrap().is_none());
        assert!(cache.get("user:5").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_huge_ttl_does_not_overflow() {
        let cache = MemoryCache::new();
        cache.set("k", json!(1), Duration::MAX).await.unwrap();
        assert!(cache.get("k").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let cache = MemoryCache::new();
        cache.set("short", json!(1), Duration::from_secs(1)).await.unwrap();
        cache.set("long", json!(2), Duration::from_secs(100)).await.unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("long").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_expired_entries() {
        let cache = Arc::new(MemoryCache::new());
        cache.set("short", json!(1), Duration::from_secs(1)).await.unwrap();
        cache.set("long", json!(2), Duration::from_secs(3600)).await.unwrap();

        let handle = MemoryCache::spawn_sweeper(Arc::clone(&cache), Duration::from_secs(2));
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(cache.len(), 1);
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweeper_can_be_aborted() {
        let handle = MemoryCache::spawn_sweeper(Arc::new(MemoryCache::new()), Duration::from_secs(1));
        handle.abort();
        let result = handle.await;
        assert!(result.unwrap_err().is_cancelled());
    }
}
