//! HTTP request handlers

pub mod errors;
pub mod home;
pub mod monster;
