//! Domain models for Warden.
//!
//! These are the core types shared across all crates.

pub mod admin_user;
pub mod client;
pub mod client_config;
pub mod client_user;
pub mod schema;
