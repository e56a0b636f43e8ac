//! Image cache clients
//!
//! Rendered identicons are stored as opaque bytes under the escaped
//! identifier. Entries are trusted as-is: no TTL, versioning or eviction is
//! applied here; whatever the backing store does by default is what happens.
//!
//! - [`RedisCache`] - production backend (`GET key` / `SET key value`)
//! - [`MemoryCache`] - process-local map for local runs and tests

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use crate::config::{CacheBackend, CacheConfig};
use crate::errors::CacheResult;

mod memory;
mod redis_cache;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

/// Key-value access to cached images
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageCache: Send + Sync {
    /// Look up an image; `Ok(None)` is a miss
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>>;

    /// Store an image, replacing any previous value (last write wins)
    async fn set(&self, key: &str, image: Bytes) -> CacheResult<()>;
}

/// Build the cache client selected by configuration
pub fn from_config(config: &CacheConfig) -> CacheResult<Arc<dyn ImageCache>> {
    match config.backend {
        CacheBackend::Redis => Ok(Arc::new(RedisCache::new(&config.url, config.timeout)?)),
        CacheBackend::Memory => Ok(Arc::new(MemoryCache::new())),
    }
}
