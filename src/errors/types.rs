//! Error type definitions for identidock
//!
//! Each external collaborator gets its own enum so failure kinds are
//! enumerated at the call site instead of caught generically.

use thiserror::Error;

/// Top-level application error type
///
/// Anything that reaches the web layer as an `AppError` is rendered by the
/// internal-error handler: a fixed body, with the detail kept for logging.
#[derive(Error, Debug)]
pub enum AppError {
    /// Cache store failures that the request cannot recover from
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Failures talking to the key-value store holding rendered images
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache store unavailable: {message}")]
    Unavailable { message: String },
}

/// Failures fetching an image from the identicon generator
#[derive(Error, Debug)]
pub enum FetchError {
    /// No complete response inside the configured timeout
    #[error("Request timed out: {url}")]
    Timeout { url: String },

    /// The generator answered with a non-2xx status
    #[error("HTTP error: {status} - {url}")]
    Status { status: u16, url: String },

    /// Connection refused, DNS failure, truncated body and similar
    #[error("Transport error: {url} - {message}")]
    Transport { url: String, message: String },

    #[error("Invalid URL: {url} - {message}")]
    InvalidUrl { url: String, message: String },
}

/// Outcome of the cache-aside retrieval when no image could be produced
#[derive(Error, Debug)]
pub enum IdenticonError {
    #[error("Upstream fetch failed: {0}")]
    Upstream(#[from] FetchError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl CacheError {
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

impl FetchError {
    /// Classify a reqwest failure for the given URL
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = error.status() {
            Self::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}
