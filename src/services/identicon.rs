//! Cache-aside identicon retrieval
//!
//! Images are looked up in the cache under the escaped identifier. On a miss
//! the generator is called once and the result written back. Concurrent
//! misses for the same identifier are not coalesced; each one fetches and
//! the store keeps the last write.

use bytes::Bytes;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::IdenticonSource;
use crate::cache::ImageCache;
use crate::errors::IdenticonError;
use crate::events::EventSink;
use crate::utils::escape_html;

const ENDPOINT: &str = "/monster";

#[derive(Clone)]
pub struct IdenticonService {
    cache: Arc<dyn ImageCache>,
    source: Arc<dyn IdenticonSource>,
    events: Arc<dyn EventSink>,
    size: u32,
}

impl IdenticonService {
    pub fn new(
        cache: Arc<dyn ImageCache>,
        source: Arc<dyn IdenticonSource>,
        events: Arc<dyn EventSink>,
        size: u32,
    ) -> Self {
        Self {
            cache,
            source,
            events,
            size,
        }
    }

    /// Return the PNG for `identifier`, generating and caching it on a miss.
    ///
    /// Cached bytes are returned as-is. A failed fetch is not retried and
    /// leaves the cache untouched.
    pub async fn retrieve(&self, identifier: &str) -> Result<Bytes, IdenticonError> {
        let key = escape_html(identifier);

        match self.cache.get(&key).await? {
            Some(image) => {
                debug!("Cache hit for {} ({} bytes)", key, image.len());
                self.events.info(
                    format!("Cache hit for: {key}"),
                    json!({
                        "endpoint": ENDPOINT,
                        "cache_status": "hit",
                        "image_size": image.len(),
                    }),
                );
                Ok(image)
            }
            None => self.generate(&key).await,
        }
    }

    async fn generate(&self, key: &str) -> Result<Bytes, IdenticonError> {
        self.events.info(
            format!("Cache miss for: {key}"),
            json!({
                "endpoint": ENDPOINT,
                "cache_status": "miss",
            }),
        );

        let image = match self.source.fetch(key, self.size).await {
            Ok(image) => image,
            Err(e) => {
                error!("Failed to generate identicon for {}: {}", key, e);
                self.events.error(
                    format!("Failed to generate monster: {e}"),
                    json!({
                        "endpoint": ENDPOINT,
                        "error": e.to_string(),
                        "cache_status": "error",
                    }),
                );
                return Err(e.into());
            }
        };

        match self.cache.set(key, image.clone()).await {
            Ok(()) => {
                self.events.info(
                    "Image generated and cached",
                    json!({
                        "endpoint": ENDPOINT,
                        "cache_status": "set",
                        "image_size": image.len(),
                    }),
                );
            }
            Err(e) => {
                // Serve the image anyway; the next request misses and fetches again
                warn!("Failed to cache identicon for {}: {}", key, e);
                self.events.warning(
                    format!("Failed to cache generated image: {e}"),
                    json!({
                        "endpoint": ENDPOINT,
                        "error": e.to_string(),
                        "cache_status": "write_error",
                        "image_size": image.len(),
                    }),
                );
            }
        }

        Ok(image)
    }
}
