//! Backend that follows the live configuration.

use crate::backend::CacheBackend;
use crate::selector::{BackendKind, CacheSelector};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::warn;
use warden_config::ConfigLoader;
use warden_core::WardenResult;

/// Re-selects the backend from the current configuration on every call.
///
/// After [`ConfigLoader::reload`] adds or removes the Redis host, the next
/// operation goes to the other backend. A backend that was inactive missed
/// every invalidation made in the meantime, so it is cleared when it becomes
/// active again. The abandoned in-process map is cleared as well. If the
/// entering backend cannot be cleared the call fails and the switch is
/// retried on the next call.
#[derive(Clone)]
pub struct ConfiguredCache {
    selector: Arc<CacheSelector>,
    config: ConfigLoader,
    active: Arc<Mutex<Option<BackendKind>>>,
}

impl ConfiguredCache {
    /// Wraps a selector and the loader it reads from.
    #[must_use]
    pub fn new(selector: Arc<CacheSelector>, config: ConfigLoader) -> Self {
        Self {
            selector,
            config,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the backend the current configuration selects.
    pub async fn current(&self) -> WardenResult<Arc<dyn CacheBackend>> {
        let kind = self.config.read(|config| BackendKind::for_config(&config.cache)).await;

        let mut active = self.active.lock().await;
        let backend = self.backend(kind).await?;
        if let Some(previous) = *active {
            if previous != kind {
                self.switch(previous, kind).await?;
            }
        }
        *active = Some(kind);

        Ok(backend)
    }

    async fn backend(&self, kind: BackendKind) -> WardenResult<Arc<dyn CacheBackend>> {
        match kind {
            BackendKind::Memory => Ok(self.selector.memory().await),
            BackendKind::Redis => {
                if let Some(redis) = self.selector.built_redis() {
                    return Ok(redis);
                }
                let cache = self.config.read(|config| config.cache.clone()).await;
                Ok(self.selector.redis(&cache).await?)
            }
        }
    }

    async fn switch(&self, from: BackendKind, to: BackendKind) -> WardenResult<()> {
        warn!(
            from = from.name(),
            to = to.name(),
            "Cache backend switched, dropping entries the new backend may hold"
        );

        if from == BackendKind::Memory {
            self.selector.memory().await.clear();
        }

        match to {
            BackendKind::Memory => self.selector.memory().await.clear(),
            BackendKind::Redis => {
                if let Some(redis) = self.selector.built_redis() {
                    redis.clear().await?;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CacheBackend for ConfiguredCache {
    fn name(&self) -> &'static str {
        "configured"
    }

    async fn get(&self, key: &str) -> WardenResult<Option<Value>> {
        self.current().await?.get(key).await
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> WardenResult<()> {
        self.current().await?.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> WardenResult<()> {
        self.current().await?.delete(key).await
    }

    async fn delete_namespace(&self, prefix: &str) -> WardenResult<u64> {
        self.current().await?.delete_namespace(prefix).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use warden_core::WardenError;

    const MINUTE: Duration = Duration::from_secs(60);
    const DEFAULT_TOML: &str = "[security]\njwt_secret = \"0123456789abcdef0123456789abcdef\"\n";
    // Nothing listens on port 1, so every Redis command is refused.
    const UNREACHABLE_REDIS: &str =
        "[cache.redis]\nhost = \"127.0.0.1\"\nport = 1\nconnect_timeout_secs = 1\nread_timeout_secs = 1\n";

    fn configured(dir: &Path) -> (ConfigLoader, ConfiguredCache) {
        fs::write(dir.join("default.toml"), DEFAULT_TOML).unwrap();
        let loader = ConfigLoader::new(dir).unwrap();
        let cache = ConfiguredCache::new(Arc::new(CacheSelector::new()), loader.clone());
        (loader, cache)
    }

    #[tokio::test]
    async fn test_follows_reloaded_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let (loader, cache) = configured(dir.path());
        assert_eq!(cache.current().await.unwrap().name(), "memory");

        fs::write(dir.path().join("local.toml"), UNREACHABLE_REDIS).unwrap();
        loader.reload().await.unwrap();
        assert!(cache.selector.built_redis().is_none());

        // Switching to Redis clears it first, which needs a live server.
        let err = cache.get("user:1").await.unwrap_err();
        assert!(matches!(err, WardenError::Cache(_)));
        assert!(cache.selector.built_redis().is_some());
    }

    #[tokio::test]
    async fn test_entries_survive_reload_without_switch() {
        let dir = tempfile::tempdir().unwrap();
        let (loader, cache) = configured(dir.path());
        cache.set("user:1", json!(1), MINUTE).await.unwrap();

        fs::write(dir.path().join("local.toml"), "[cache]\nexpire_secs = 30\n").unwrap();
        loader.reload().await.unwrap();

        assert_eq!(cache.get("user:1").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_invalidation_missed_while_switched_does_not_leave_stale_entry() {
        let dir = tempfile::tempdir().unwrap();
        let (loader, cache) = configured(dir.path());
        cache.set("user:1", json!({"fullname": null}), MINUTE).await.unwrap();

        fs::write(dir.path().join("local.toml"), UNREACHABLE_REDIS).unwrap();
        loader.reload().await.unwrap();
        assert!(cache.delete("user:1").await.is_err());

        fs::remove_file(dir.path().join("local.toml")).unwrap();
        loader.reload().await.unwrap();

        assert_eq!(cache.get("user:1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_switch_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let (loader, cache) = configured(dir.path());
        cache.current().await.unwrap();

        fs::write(dir.path().join("local.toml"), UNREACHABLE_REDIS).unwrap();
        loader.reload().await.unwrap();

        assert!(cache.get("user:1").await.is_err());
        assert!(cache.get("user:1").await.is_err());
        assert_eq!(*cache.active.lock().await, Some(BackendKind::Memory));
    }
}
