use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::IdenticonConfig;
use crate::errors::{FetchError, FetchResult};

/// Source of rendered identicon images
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdenticonSource: Send + Sync {
    /// Render `identifier` at `size` pixels; a single attempt
    async fn fetch(&self, identifier: &str, size: u32) -> FetchResult<Bytes>;
}

/// HTTP client for a dnmonster-style generator (`GET /monster/<id>?size=<n>`)
pub struct HttpIdenticonClient {
    client: Client,
    base_url: Url,
}

impl HttpIdenticonClient {
    /// Build a client whose every request is bounded by `config.timeout`
    pub fn new(config: &IdenticonConfig) -> FetchResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| FetchError::InvalidUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl {
                url: config.base_url.clone(),
                message: "URL cannot have path segments".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                url: config.base_url.clone(),
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self { client, base_url })
    }

    /// URL for one image; the identifier is percent-encoded as a single path segment
    pub fn monster_url(&self, identifier: &str, size: u32) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("monster").push(identifier);
        }
        url.query_pairs_mut().append_pair("size", &size.to_string());
        url
    }
}

#[async_trait]
impl IdenticonSource for HttpIdenticonClient {
    async fn fetch(&self, identifier: &str, size: u32) -> FetchResult<Bytes> {
        let url = self.monster_url(identifier, size);
        debug!("Fetching identicon from {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let image = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

        debug!("Fetched {} bytes for {}", image.len(), identifier);
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client(base_url: &str) -> HttpIdenticonClient {
        HttpIdenticonClient::new(&IdenticonConfig {
            base_url: base_url.to_string(),
            size: 80,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_monster_url_layout() {
        let url = client("http://dnmonster:8080").monster_url("Alice", 80);
        assert_eq!(url.as_str(), "http://dnmonster:8080/monster/Alice?size=80");
    }

    #[test]
    fn test_monster_url_keeps_base_path() {
        let url = client("http://images.internal/v1/").monster_url("Bob", 120);
        assert_eq!(url.as_str(), "http://images.internal/v1/monster/Bob?size=120");
    }

    #[test]
    fn test_identifier_stays_one_segment() {
        let url = client("http://dnmonster:8080").monster_url("a/b c?#", 80);
        assert_eq!(url.path(), "/monster/a%2Fb%20c%3F%23");
        assert_eq!(url.query(), Some("size=80"));
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        let config = IdenticonConfig {
            base_url: "mailto:someone@example.com".to_string(),
            ..IdenticonConfig::default()
        };
        assert!(matches!(
            HttpIdenticonClient::new(&config),
            Err(FetchError::InvalidUrl { .. })
        ));
    }
}
