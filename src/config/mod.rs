use anyhow::Result;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::errors::AppError;

pub mod defaults;
pub mod duration_serde;

use defaults::*;

/// Environment variable prefix; nested keys are separated by `__`
/// (for example `IDENTIDOCK_EVENT_LOG__HOST`).
pub const ENV_PREFIX: &str = "IDENTIDOCK_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub web: WebConfig,
    pub site: SiteConfig,
    pub cache: CacheConfig,
    pub identicon: IdenticonConfig,
    pub event_log: EventLogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Values baked into every rendered page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Prefix mixed into every display-name digest
    #[serde(default = "default_salt")]
    pub salt: String,
    /// Name shown when the form has not been submitted
    #[serde(default = "default_display_name")]
    pub default_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Redis,
    /// Process-local map, nothing survives a restart
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_backend")]
    pub backend: CacheBackend,
    #[serde(default = "default_cache_url")]
    pub url: String,
    /// Bound on connecting and on each command round trip
    #[serde(default = "default_cache_timeout", with = "duration_serde::duration")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdenticonConfig {
    #[serde(default = "default_identicon_base_url")]
    pub base_url: String,
    #[serde(default = "default_identicon_size")]
    pub size: u32,
    #[serde(default = "default_identicon_timeout", with = "duration_serde::duration")]
    pub timeout: Duration,
}

/// Remote event collector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogConfig {
    #[serde(default = "default_event_log_enabled")]
    pub enabled: bool,
    #[serde(default = "default_collector_host")]
    pub host: String,
    #[serde(default = "default_collector_port")]
    pub port: u16,
    /// Bound on connect and write for each delivery attempt
    #[serde(default = "default_collector_timeout", with = "duration_serde::duration")]
    pub timeout: Duration,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_salt() -> String {
    DEFAULT_SALT.to_string()
}

fn default_display_name() -> String {
    DEFAULT_DISPLAY_NAME.to_string()
}

fn default_cache_backend() -> CacheBackend {
    CacheBackend::Redis
}

fn default_cache_url() -> String {
    DEFAULT_CACHE_URL.to_string()
}

fn default_cache_timeout() -> Duration {
    Duration::from_secs(DEFAULT_CACHE_TIMEOUT_SECONDS)
}

fn default_identicon_base_url() -> String {
    DEFAULT_IDENTICON_BASE_URL.to_string()
}

fn default_identicon_size() -> u32 {
    DEFAULT_IDENTICON_SIZE
}

fn default_identicon_timeout() -> Duration {
    Duration::from_secs(DEFAULT_IDENTICON_TIMEOUT_SECONDS)
}

fn default_event_log_enabled() -> bool {
    true
}

fn default_collector_host() -> String {
    DEFAULT_COLLECTOR_HOST.to_string()
}

fn default_collector_port() -> u16 {
    DEFAULT_COLLECTOR_PORT
}

fn default_collector_timeout() -> Duration {
    Duration::from_secs(DEFAULT_COLLECTOR_TIMEOUT_SECONDS)
}

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

fn default_queue_capacity() -> usize {
    DEFAULT_EVENT_QUEUE_CAPACITY
}

fn default_max_attempts() -> u32 {
    DEFAULT_EVENT_MAX_ATTEMPTS
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            salt: default_salt(),
            default_name: default_display_name(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            url: default_cache_url(),
            timeout: default_cache_timeout(),
        }
    }
}

impl Default for IdenticonConfig {
    fn default() -> Self {
        Self {
            base_url: default_identicon_base_url(),
            size: default_identicon_size(),
            timeout: default_identicon_timeout(),
        }
    }
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            enabled: default_event_log_enabled(),
            host: default_collector_host(),
            port: default_collector_port(),
            timeout: default_collector_timeout(),
            service_name: default_service_name(),
            queue_capacity: default_queue_capacity(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl EventLogConfig {
    /// Collector address in `host:port` form
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Layer defaults, the TOML file and `IDENTIDOCK_*` environment variables.
    ///
    /// A missing file is created from the defaults so operators have something to edit.
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if !Path::new(config_file).exists() {
            let contents = toml::to_string_pretty(&Self::default())?;
            match std::fs::write(config_file, contents) {
                Ok(()) => info!("Created default config file: {}", config_file),
                Err(e) => warn!("Could not write default config file {}: {}", config_file, e),
            }
        }

        let config: Config = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would only fail later at request time
    pub fn validate(&self) -> Result<(), AppError> {
        if self.web.port == 0 {
            return Err(AppError::configuration("web.port must be non-zero"));
        }
        if self.site.salt.is_empty() {
            return Err(AppError::configuration("site.salt must not be empty"));
        }
        if self.identicon.size == 0 {
            return Err(AppError::configuration("identicon.size must be positive"));
        }
        if let Err(e) = url::Url::parse(&self.identicon.base_url) {
            return Err(AppError::configuration(format!(
                "identicon.base_url '{}' is not a valid URL: {}",
                self.identicon.base_url, e
            )));
        }
        if self.cache.timeout.is_zero() {
            return Err(AppError::configuration("cache.timeout must be positive"));
        }
        if self.event_log.queue_capacity == 0 {
            return Err(AppError::configuration("event_log.queue_capacity must be positive"));
        }
        if self.event_log.max_attempts == 0 {
            return Err(AppError::configuration("event_log.max_attempts must be at least 1"));
        }
        Ok(())
    }
}
