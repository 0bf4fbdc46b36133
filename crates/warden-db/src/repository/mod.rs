//! SurrealDB repository implementations.

mod admin_user;
mod client;
mod client_config;
mod client_user;

pub use admin_user::SurrealAdminUserRepository;
pub use client::SurrealClientRepository;
pub use client_config::SurrealClientConfigRepository;
pub use client_user::SurrealClientUserRepository;

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::models::schema::SchemaName;
use warden_core::repository::TenantRepositoryFactory;

use crate::error::DbError;

/// How many times a `CREATE` is sent when the store keeps reporting a
/// transaction conflict. Once the competing write commits, the next
/// attempt meets its unique index instead.
pub(crate) const WRITE_ATTEMPTS: usize = 5;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

pub(crate) fn parse_record_id(raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))
}

/// Hands out tenant-scoped repositories sharing one connection.
pub struct SurrealTenantRepositoryFactory<C: Connection> {
    db: Surreal<C>,
    home: SchemaName,
}

impl<C: Connection> Clone for SurrealTenantRepositoryFactory<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            home: self.home.clone(),
        }
    }
}

impl<C: Connection> SurrealTenantRepositoryFactory<C> {
    /// `home` is the database the connection was opened on.
    pub fn new(db: Surreal<C>, home: SchemaName) -> Self {
        Self { db, home }
    }
}

impl<C: Connection> TenantRepositoryFactory for SurrealTenantRepositoryFactory<C> {
    type Users = SurrealClientUserRepository<C>;
    type Configs = SurrealClientConfigRepository<C>;

    fn users(&self, schema: &SchemaName) -> Self::Users {
        SurrealClientUserRepository::new(self.db.clone(), schema.clone(), self.home.clone())
    }

    fn configs(&self, schema: &SchemaName) -> Self::Configs {
        SurrealClientConfigRepository::new(self.db.clone(), schema.clone(), self.home.clone())
    }
}
