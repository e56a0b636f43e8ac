use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::ImageCache;
use crate::errors::CacheResult;

/// In-process image cache, unbounded and never evicting
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Bytes>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }
}

#[async_trait]
impl ImageCache for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, image: Bytes) -> CacheResult<()> {
        self.entries.write().await.insert(key.to_string(), image);
        Ok(())
    }
}
