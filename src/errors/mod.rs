//! Centralized error handling for identidock
//!
//! # Error Categories
//!
//! - **Cache Errors**: the key-value store holding rendered images
//! - **Fetch Errors**: the external identicon generator
//! - **Identicon Errors**: the combined outcome of a cache-aside retrieval
//! - **Application Errors**: configuration and cache faults surfaced to the web layer
//!
//! # Usage
//!
//! ```rust
//! use identidock::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("site.salt must not be empty"))
//! }
//!
//! assert!(example_function().is_err());
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for cache store Results
pub type CacheResult<T> = Result<T, CacheError>;

/// Convenience type alias for identicon generator Results
pub type FetchResult<T> = Result<T, FetchError>;
