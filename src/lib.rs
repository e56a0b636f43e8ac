pub mod cache;
pub mod config;
pub mod errors;
pub mod events;
pub mod services;
pub mod utils;
pub mod web;
