//! Warden Database: SurrealDB connection management, migrations,
//! tenant schema provisioning and repository implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Shared-table migrations ([`run_migrations`])
//! - Tenant schema lifecycle ([`SurrealSchemaProvisioner`])
//! - Repositories for the `warden-core` traits ([`repository`])
//! - Error types ([`DbError`])

mod connection;
mod error;
mod provisioner;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use provisioner::SurrealSchemaProvisioner;
pub use schema::{TENANT_CONFIG_TABLE, TENANT_USER_TABLE, run_migrations, tenant_schema};
