//! Utility modules for identidock
//!
//! Pure helpers shared by the web handlers and the identicon service.

pub mod hashing;
pub mod html;

pub use hashing::name_digest;
pub use html::escape_html;
