//! Redis container shared by the backend integration tests.

use std::time::Duration;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::redis::{Redis, REDIS_PORT};
use warden_cache::RedisCache;
use warden_config::RedisConfig;

/// A fresh Redis container and a backend connected to it.
pub struct TestRedis {
    _container: ContainerAsync<Redis>,
    cache: RedisCache,
}

impl TestRedis {
    /// Starts a Redis container, or returns `None` when Docker is unavailable.
    pub async fn start() -> Option<Self> {
        let container = match Redis::default().start().await {
            Ok(container) => container,
            Err(e) => {
                eprintln!("skipping Redis test, container did not start: {}", e);
                return None;
            }
        };
        let port = container
            .get_host_port_ipv4(REDIS_PORT)
            .await
            .expect("Failed to get Redis port");

        let config = RedisConfig {
            host: Some("127.0.0.1".to_string()),
            port,
            ..RedisConfig::default()
        };
        let cache = RedisCache::from_config(&config).expect("Failed to build Redis pool");
        Self::wait_until_ready(&cache, 10).await;

        Some(Self {
            _container: container,
            cache,
        })
    }

    /// The backend under test.
    pub fn cache(&self) -> &RedisCache {
        &self.cache
    }

    async fn wait_until_ready(cache: &RedisCache, max_attempts: u32) {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match cache.ping().await {
                Ok(()) => return,
                Err(e) => {
                    if attempts >= max_attempts {
                        panic!("Redis did not answer PING after {} attempts: {}", max_attempts, e);
                    }
                    tokio::time::sleep(Duration::from_millis(500)).await;
                }
            }
        }
    }
}
