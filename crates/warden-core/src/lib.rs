//! Warden Core: domain models, tenant schema naming, input validation,
//! and the repository traits implemented by `warden-db`.

pub mod error;
pub mod models;
pub mod repository;
pub mod validation;

pub use error::{ErrorKind, WardenError, WardenResult};
pub use models::schema::SchemaName;
