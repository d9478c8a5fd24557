//! Key-value cache adapters
//!
//! The history store only needs two operations from the external cache:
//! read a string value and write one with an expiry.

pub mod memory;
pub mod redis_cache;

pub use self::memory::MemoryCache;
pub use self::redis_cache::RedisCache;

use crate::config::{CacheBackend, CacheConfig};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// String key-value store with per-entry expiry
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a value, `None` when the key is absent or expired
    async fn get(&self, key: &str) -> crate::Result<Option<String>>;

    /// Store a value that expires after `ttl`, replacing any previous value
    /// and its expiry
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> crate::Result<()>;
}

/// Build the configured cache backend
pub fn from_config(config: &CacheConfig) -> crate::Result<Arc<dyn CacheStore>> {
    match config.backend {
        CacheBackend::Redis => Ok(Arc::new(RedisCache::from_config(config)?)),
        CacheBackend::Memory => Ok(Arc::new(MemoryCache::new())),
    }
}
