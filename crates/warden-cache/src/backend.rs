//! Cache backend contract.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use warden_core::{WardenError, WardenResult};

#[cfg(test)]
use mockall::automock;

/// Storage contract shared by every cache backend.
///
/// Payloads cross this boundary as JSON values. An absent key is `Ok(None)`;
/// `Err` always means the backend itself failed.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the live value stored under `key`.
    async fn get(&self, key: &str) -> WardenResult<Option<Value>>;

    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    ///
    /// A zero `ttl` leaves nothing readable behind.
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> WardenResult<()>;

    /// Removes `key`. Missing keys are not an error.
    async fn delete(&self, key: &str) -> WardenResult<()>;

    /// Removes every key that starts with the literal `prefix`.
    ///
    /// Returns the number of keys removed.
    async fn delete_namespace(&self, prefix: &str) -> WardenResult<u64>;
}

/// Typed helpers over any [`CacheBackend`].
#[async_trait]
pub trait CacheExt: CacheBackend {
    /// Gets a value and decodes it into `T`.
    async fn get_as<T: DeserializeOwned + Send>(&self, key: &str) -> WardenResult<Option<T>> {
        match self.get(key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| WardenError::Cache(format!("Failed to decode key '{}': {}", key, e))),
            None => Ok(None),
        }
    }

    /// Encodes `value` and stores it.
    async fn set_as<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: Duration) -> WardenResult<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| WardenError::Cache(format!("Failed to encode key '{}': {}", key, e)))?;
        self.set(key, value, ttl).await
    }

    /// Returns the cached value, or computes, stores and returns it.
    ///
    /// Errors from the factory are returned as-is and nothing is stored.
    async fn get_or_set<T, F, Fut>(&self, key: &str, ttl: Duration, factory: F) -> WardenResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = WardenResult<T>> + Send,
    {
        if let Some(cached) = self.get_as::<T>(key).await? {
            return Ok(cached);
        }

        let value = factory().await?;
        self.set_as(key, &value, ttl).await?;
        Ok(value)
    }
}

impl<B: CacheBackend + ?Sized> CacheExt for B {}
