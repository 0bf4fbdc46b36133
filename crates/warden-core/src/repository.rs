//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lookups return `Ok(None)` when
//! the record does not exist; whether absence means "not found" or
//! "unauthorized" is decided by the caller. A unique-constraint rejection
//! from the store surfaces as [`WardenError::Conflict`](crate::error::WardenError).
//!
//! Tenant-scoped repositories are not parameterized per call. They are
//! built for one [`SchemaName`] by a [`TenantRepositoryFactory`] and can
//! only ever touch that schema.

use uuid::Uuid;

use crate::error::WardenResult;
use crate::models::{
    admin_user::{AdminUser, CreateAdminUser},
    client::{Client, CreateClient},
    client_config::ClientConfig,
    client_user::{ClientUser, CreateClientUser},
    schema::SchemaName,
};

// ---------------------------------------------------------------------------
// Shared tables
// ---------------------------------------------------------------------------

pub trait AdminUserRepository: Send + Sync {
    fn create(&self, input: CreateAdminUser)
    -> impl Future<Output = WardenResult<AdminUser>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WardenResult<Option<AdminUser>>> + Send;
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = WardenResult<Option<AdminUser>>> + Send;
    fn get_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = WardenResult<Option<AdminUser>>> + Send;
    fn username_exists(&self, username: &str) -> impl Future<Output = WardenResult<bool>> + Send;
    fn email_exists(&self, email: &str) -> impl Future<Output = WardenResult<bool>> + Send;
    fn update_password(
        &self,
        id: Uuid,
        password_hash: String,
    ) -> impl Future<Output = WardenResult<Option<AdminUser>>> + Send;
    /// Deletes the user together with the client rows it owns.
    fn delete(&self, id: Uuid) -> impl Future<Output = WardenResult<()>> + Send;
}

pub trait ClientRepository: Send + Sync {
    /// Persist a client. The secret is generated here, never by callers.
    fn create(&self, input: CreateClient) -> impl Future<Output = WardenResult<Client>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WardenResult<Option<Client>>> + Send;
    fn get_by_secret(
        &self,
        client_secret: &str,
    ) -> impl Future<Output = WardenResult<Option<Client>>> + Send;
    fn get_by_name_for_owner(
        &self,
        client_name: &str,
        owner_user_id: Uuid,
    ) -> impl Future<Output = WardenResult<Option<Client>>> + Send;
    fn list_by_owner(
        &self,
        owner_user_id: Uuid,
    ) -> impl Future<Output = WardenResult<Vec<Client>>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = WardenResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant schema lifecycle
// ---------------------------------------------------------------------------

pub trait SchemaProvisioner: Send + Sync {
    /// Create the isolated namespace. Calling it again is a no-op.
    fn create_schema(&self, schema: &SchemaName) -> impl Future<Output = WardenResult<()>> + Send;
    /// Ensure the tenant `users` and `configs` tables exist in `schema`.
    fn migrate_tenant_tables(
        &self,
        schema: &SchemaName,
    ) -> impl Future<Output = WardenResult<()>> + Send;
    fn drop_schema(&self, schema: &SchemaName) -> impl Future<Output = WardenResult<()>> + Send;
    fn schema_exists(&self, schema: &SchemaName)
    -> impl Future<Output = WardenResult<bool>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant-scoped repositories
// ---------------------------------------------------------------------------

pub trait ClientUserRepository: Send + Sync {
    fn schema(&self) -> &SchemaName;
    fn create(
        &self,
        input: CreateClientUser,
    ) -> impl Future<Output = WardenResult<ClientUser>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WardenResult<Option<ClientUser>>> + Send;
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = WardenResult<Option<ClientUser>>> + Send;
    fn get_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = WardenResult<Option<ClientUser>>> + Send;
    fn username_exists(&self, username: &str) -> impl Future<Output = WardenResult<bool>> + Send;
    fn email_exists(&self, email: &str) -> impl Future<Output = WardenResult<bool>> + Send;
    fn list(&self) -> impl Future<Output = WardenResult<Vec<ClientUser>>> + Send;
}

pub trait ClientConfigRepository: Send + Sync {
    fn get(&self) -> impl Future<Output = WardenResult<Option<ClientConfig>>> + Send;
    /// Replace the settings document, creating it on first write.
    fn put(
        &self,
        settings: serde_json::Value,
    ) -> impl Future<Output = WardenResult<ClientConfig>> + Send;
}

/// Builds repositories bound to a single tenant schema.
pub trait TenantRepositoryFactory: Send + Sync {
    type Users: ClientUserRepository;
    type Configs: ClientConfigRepository;

    fn users(&self, schema: &SchemaName) -> Self::Users;
    fn configs(&self, schema: &SchemaName) -> Self::Configs;
}
