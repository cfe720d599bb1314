//! Backend selection.

use crate::backend::CacheBackend;
use crate::memory::MemoryCache;
use crate::redis_cache::RedisCache;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;
use warden_config::CacheConfig;
use warden_core::WardenResult;

/// Which backend a configuration asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// The process-local map.
    Memory,
    /// The pooled Redis client.
    Redis,
}

impl BackendKind {
    /// Redis when a host is configured, otherwise the in-process map.
    #[must_use]
    pub fn for_config(config: &CacheConfig) -> Self {
        if config.uses_redis() {
            Self::Redis
        } else {
            Self::Memory
        }
    }

    /// Same name the backend reports through [`CacheBackend::name`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Redis => "redis",
        }
    }
}

/// Picks the cache backend for the current configuration.
///
/// The networked backend is chosen whenever a Redis host is configured,
/// otherwise the in-process one. Each backend is built at most once per
/// selector and shared by every later call, so switching configuration back
/// and forth reuses the same instances.
#[derive(Default)]
pub struct CacheSelector {
    memory: OnceCell<Arc<MemoryCache>>,
    redis: OnceCell<Arc<RedisCache>>,
}

impl CacheSelector {
    /// Creates a selector with no backend built yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the backend `config` asks for.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the networked backend is requested
    /// but its pool cannot be built.
    pub async fn select(&self, config: &CacheConfig) -> WardenResult<Arc<dyn CacheBackend>> {
        match BackendKind::for_config(config) {
            BackendKind::Redis => Ok(self.redis(config).await?),
            BackendKind::Memory => Ok(self.memory().await),
        }
    }

    /// The shared in-process backend.
    pub async fn memory(&self) -> Arc<MemoryCache> {
        self.memory
            .get_or_init(|| async {
                info!("Using in-process cache backend");
                Arc::new(MemoryCache::new())
            })
            .await
            .clone()
    }

    /// The networked backend, if an earlier call already built it.
    #[must_use]
    pub fn built_redis(&self) -> Option<Arc<RedisCache>> {
        self.redis.get().cloned()
    }

    /// The shared networked backend, built from `config` on first use.
    pub async fn redis(&self, config: &CacheConfig) -> WardenResult<Arc<RedisCache>> {
        self.redis
            .get_or_try_init(|| async {
                info!("Using Redis cache backend");
                RedisCache::from_config(&config.redis).map(Arc::new)
            })
            .await
            .cloned()
    }
}
