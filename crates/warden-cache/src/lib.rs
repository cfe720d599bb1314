//! # Warden Cache
//!
//! A pluggable cache shared by the service layer. Two backends implement the
//! same [`CacheBackend`] contract:
//!
//! - [`MemoryCache`]: process-local map with lazy TTL expiry
//! - [`RedisCache`]: pooled Redis client with server-side TTL
//!
//! [`CacheSelector`] picks one from configuration, [`Memoize`] wraps an
//! async computation in read-through caching, and [`keys`] holds the key
//! scheme the user services invalidate against.

mod backend;
mod configured;
mod key;
pub mod keys;
mod memoize;
mod memory;
mod redis_cache;
mod selector;

pub use backend::{CacheBackend, CacheExt};
pub use configured::ConfiguredCache;
pub use key::{CacheKey, KeyDimensions, DEFAULT_DELIMITER};
pub use memoize::Memoize;
pub use memory::MemoryCache;
pub use redis_cache::{escape_glob, RedisCache};
pub use selector::{BackendKind, CacheSelector};

#[cfg(test)]
pub use backend::MockCacheBackend;
