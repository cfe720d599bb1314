//! Redis cache backend.

use crate::backend::CacheBackend;
use async_trait::async_trait;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use redis::AsyncCommands;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;
use warden_config::RedisConfig;
use warden_core::{WardenError, WardenResult};

const SCAN_BATCH: usize = 100;

/// Cache backend stored in Redis as JSON strings with server-side expiry.
///
/// One pool is shared by every caller. Each operation borrows a single
/// connection and is bounded by the configured read timeout.
#[derive(Clone)]
pub struct RedisCache {
    pool: Pool,
    read_timeout: Duration,
}

impl RedisCache {
    /// Builds the connection pool described by `config`.
    ///
    /// No connection is opened here; call [`ping`](Self::ping) to check the
    /// server is reachable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no host is set or the pool cannot
    /// be built.
    pub fn from_config(config: &RedisConfig) -> WardenResult<Self> {
        let url = connection_url(config)?;
        info!(
            host = url.host_str().unwrap_or_default(),
            port = config.port,
            db = config.db,
            pool_size = config.pool_size,
            "Creating Redis cache pool"
        );

        let pool = Config::from_url(url.as_str())
            .builder()
            .map_err(|e| WardenError::Configuration(format!("Invalid Redis config: {}", e)))?
            .max_size(config.pool_size)
            .wait_timeout(Some(config.connect_timeout()))
            .create_timeout(Some(config.connect_timeout()))
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| WardenError::Configuration(format!("Failed to create Redis pool: {}", e)))?;

        Ok(Self {
            pool,
            read_timeout: config.read_timeout(),
        })
    }

    /// Sends PING over a pooled connection.
    pub async fn ping(&self) -> WardenResult<()> {
        let mut conn = self.conn().await?;
        self.timed("PING", async {
            redis::cmd("PING").query_async::<String>(&mut conn).await
        })
        .await?;
        Ok(())
    }

    /// Drops every key in the configured database.
    ///
    /// Administrative only. Services invalidate through
    /// [`CacheBackend::delete_namespace`].
    pub async fn clear(&self) -> WardenResult<()> {
        let mut conn = self.conn().await?;
        self.timed("FLUSHDB", async {
            redis::cmd("FLUSHDB").arg("ASYNC").query_async::<()>(&mut conn).await
        })
        .await?;
        info!("Redis cache database flushed");
        Ok(())
    }

    async fn conn(&self) -> WardenResult<Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| WardenError::Cache(format!("Failed to get Redis connection: {}", e)))
    }

    async fn timed<T, F>(&self, what: &str, fut: F) -> WardenResult<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        tokio::time::timeout(self.read_timeout, fut)
            .await
            .map_err(|_| WardenError::Cache(format!("{} timed out after {:?}", what, self.read_timeout)))?
            .map_err(|e| WardenError::Cache(format!("{} failed: {}", what, e)))
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> WardenResult<Option<Value>> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = self.timed("GET", conn.get(key)).await?;

        match raw {
            Some(raw) => {
                debug!(key, "cache hit");
                serde_json::from_str(&raw)
                    .map(Some)
                    .map_err(|e| WardenError::Cache(format!("Failed to decode key '{}': {}", key, e)))
            }
            None => {
                debug!(key, "cache miss");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> WardenResult<()> {
        if ttl.is_zero() {
            return self.delete(key).await;
        }

        let payload = serde_json::to_string(&value)
            .map_err(|e| WardenError::Cache(format!("Failed to encode key '{}': {}", key, e)))?;
        let ttl_secs = expire_secs(ttl);

        let mut conn = self.conn().await?;
        self.timed("SETEX", conn.set_ex::<_, _, ()>(key, payload, ttl_secs))
            .await?;

        debug!(key, ttl_secs, "cache set");
        Ok(())
    }

    async fn delete(&self, key: &str) -> WardenResult<()> {
        let mut conn = self.conn().await?;
        let deleted: i64 = self.timed("DEL", conn.del(key)).await?;
        debug!(key, existed = deleted > 0, "cache delete");
        Ok(())
    }

    async fn delete_namespace(&self, prefix: &str) -> WardenResult<u64> {
        let mut conn = self.conn().await?;
        let pattern = format!("{}*", escape_glob(prefix));
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = self
                .timed(
                    "SCAN",
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn),
                )
                .await?;

            for key in keys {
                let deleted: i64 = self.timed("DEL", conn.del(&key)).await?;
                removed += u64::try_from(deleted).unwrap_or(0);
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(prefix, removed, "cache namespace deleted");
        Ok(removed)
    }
}

/// Escapes Redis glob metacharacters so `input` matches literally.
#[must_use]
pub fn escape_glob(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn connection_url(config: &RedisConfig) -> WardenResult<Url> {
    let host = config
        .host
        .as_deref()
        .ok_or_else(|| WardenError::configuration("Redis host is not set"))?;

    let mut url = Url::parse(&format!("redis://{}:{}/{}", host, config.port, config.db))
        .map_err(|e| WardenError::Configuration(format!("Invalid Redis address: {}", e)))?;

    if let Some(password) = config.password.as_deref() {
        url.set_password(Some(password))
            .map_err(|()| WardenError::configuration("Redis password cannot be set on this address"))?;
    }

    Ok(url)
}

// Server-side expiry has one-second resolution; round partial seconds up.
fn expire_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        secs.saturating_add(1)
    } else {
        secs
    }
}
