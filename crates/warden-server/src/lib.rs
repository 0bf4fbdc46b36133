//! Warden Server: the HTTP front of the multi-tenant auth service.

pub mod api;
pub mod config;
pub mod logging;
pub mod state;

pub use api::{app, router};
pub use config::{ConfigError, ServerConfig};
pub use state::AppState;
