//! Read-through memoization over a cache backend.

use crate::backend::{CacheBackend, CacheExt};
use crate::key::{CacheKey, KeyDimensions, DEFAULT_DELIMITER};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::debug;
use warden_core::WardenResult;

/// Caches the result of an async operation under a derived key.
///
/// The key is the base name followed by each dimension value, joined by the
/// delimiter. On a hit the operation is not run. On a miss its result is
/// stored for `ttl` and returned. Errors from the operation or the backend
/// are returned unchanged, and a failed operation stores nothing.
///
/// ```no_run
/// # use std::time::Duration;
/// # use warden_cache::{MemoryCache, Memoize};
/// # async fn demo() -> warden_core::WardenResult<()> {
/// let cache = MemoryCache::new();
/// let memo = Memoize::new("square", Duration::from_secs(60));
/// let n = 12_u64;
/// let squared: u64 = memo.run(&cache, &(n,), || async move { Ok(n * n) }).await?;
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct Memoize {
    key: String,
    ttl: Duration,
    delimiter: String,
}

impl Memoize {
    /// Creates a memoizer with the default delimiter.
    #[must_use]
    pub fn new(key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            ttl,
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }

    /// Creates a memoizer keyed by the name of the function passed in.
    ///
    /// The base key is the last path segment of the function's type name, so
    /// `named_after(&find_user, ttl)` keys entries under `find_user`. Closures
    /// have no usable name; give them an explicit key with [`Memoize::new`].
    #[must_use]
    pub fn named_after<F>(_op: &F, ttl: Duration) -> Self {
        Self::new(function_name::<F>(), ttl)
    }

    /// Overrides the segment delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Entry lifetime used on a miss.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Derives the key for one call.
    #[must_use]
    pub fn key_for<D: KeyDimensions + ?Sized>(&self, dims: &D) -> String {
        CacheKey::new(self.key.as_str())
            .with_delimiter(self.delimiter.as_str())
            .dimensions(dims)
            .build()
    }

    /// Returns the cached result for `dims`, or runs `op` and caches it.
    pub async fn run<T, D, F, Fut>(&self, cache: &dyn CacheBackend, dims: &D, op: F) -> WardenResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        D: KeyDimensions + ?Sized,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = WardenResult<T>> + Send,
    {
        let key = self.key_for(dims);

        if let Some(hit) = cache.get_as::<T>(&key).await? {
            debug!(backend = cache.name(), key = %key, "memoize hit");
            return Ok(hit);
        }

        debug!(backend = cache.name(), key = %key, "memoize miss");
        let value = op().await?;
        cache.set_as(&key, &value, self.ttl).await?;
        Ok(value)
    }
}

fn function_name<F>() -> &'static str {
    let path = std::any::type_name::<F>();
    let path = path.split('<').next().unwrap_or(path);
    path.rsplit("::").next().unwrap_or(path)
}
