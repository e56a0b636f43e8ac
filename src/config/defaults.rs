/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

// Site defaults
pub const DEFAULT_SALT: &str = "UNIQUE_SALT";
pub const DEFAULT_DISPLAY_NAME: &str = "Vadim Cucold";

// Cache store defaults
pub const DEFAULT_CACHE_URL: &str = "redis://redis:6379/0";
pub const DEFAULT_CACHE_TIMEOUT_SECONDS: u64 = 2;

// Identicon service defaults
pub const DEFAULT_IDENTICON_BASE_URL: &str = "http://dnmonster:8080";
pub const DEFAULT_IDENTICON_SIZE: u32 = 80;
pub const DEFAULT_IDENTICON_TIMEOUT_SECONDS: u64 = 5;

// Event collector defaults
pub const DEFAULT_COLLECTOR_HOST: &str = "logstash";
pub const DEFAULT_COLLECTOR_PORT: u16 = 5001;
pub const DEFAULT_COLLECTOR_TIMEOUT_SECONDS: u64 = 2;
pub const DEFAULT_SERVICE_NAME: &str = "identidock";
pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_EVENT_MAX_ATTEMPTS: u32 = 1;
