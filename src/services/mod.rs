//! Service layer
//!
//! - [`IdenticonService`]: cache-aside retrieval of rendered identicons
//! - [`HttpIdenticonClient`]: HTTP access to the external generator

pub mod identicon;
pub mod identicon_client;

pub use identicon::IdenticonService;
pub use identicon_client::{HttpIdenticonClient, IdenticonSource};

#[cfg(test)]
pub use identicon_client::MockIdenticonSource;
