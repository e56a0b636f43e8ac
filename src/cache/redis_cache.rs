use async_trait::async_trait;
use bytes::Bytes;
use redis::AsyncCommands;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

use super::ImageCache;
use crate::errors::CacheResult;

/// Reconnect attempts made by the manager before an operation fails
const CONNECT_RETRIES: usize = 1;

/// Redis-backed image cache
///
/// A single [`ConnectionManager`] is created on first use and cloned into
/// every request; it reconnects by itself after the connection drops. Connect
/// and each command are bounded by the configured timeout, so a stalled store
/// surfaces as an error instead of holding requests.
pub struct RedisCache {
    client: redis::Client,
    timeout: Duration,
    manager: OnceCell<ConnectionManager>,
}

impl RedisCache {
    /// Parse the URL without connecting
    pub fn new(url: &str, timeout: Duration) -> CacheResult<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            timeout,
            manager: OnceCell::new(),
        })
    }

    async fn connection(&self) -> CacheResult<ConnectionManager> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                debug!("Opening Redis connection manager");
                let config = ConnectionManagerConfig::new()
                    .set_connection_timeout(self.timeout)
                    .set_response_timeout(self.timeout)
                    .set_number_of_retries(CONNECT_RETRIES);
                ConnectionManager::new_with_config(self.client.clone(), config).await
            })
            .await?;
        Ok(manager.clone())
    }
}

#[async_trait]
impl ImageCache for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>> {
        let mut connection = self.connection().await?;
        let value: Option<Vec<u8>> = connection.get(key).await?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &str, image: Bytes) -> CacheResult<()> {
        let mut connection = self.connection().await?;
        connection.set::<_, _, ()>(key, image.as_ref()).await?;
        Ok(())
    }
}
