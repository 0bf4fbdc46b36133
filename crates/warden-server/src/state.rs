//! Shared application state: the services, wired to SurrealDB.

use std::sync::Arc;

use surrealdb::{Connection, Surreal};
use warden_auth::{
    AdminService, AuthConfig, AuthError, BearerGate, ClientService, ClientUserService,
    CredentialStore, TokenService,
};
use warden_core::models::schema::SchemaName;
use warden_db::SurrealSchemaProvisioner;
use warden_db::repository::{
    SurrealAdminUserRepository, SurrealClientRepository, SurrealTenantRepositoryFactory,
};

type Admins<C> = SurrealAdminUserRepository<C>;
type Clients<C> = SurrealClientRepository<C>;
type Tenants<C> = SurrealTenantRepositoryFactory<C>;

pub struct AppState<C: Connection> {
    pub admins: Arc<AdminService<Admins<C>>>,
    pub clients: Arc<ClientService<Clients<C>, SurrealSchemaProvisioner<C>, Tenants<C>>>,
    pub client_users: Arc<ClientUserService<Clients<C>, Tenants<C>>>,
    pub gate: Arc<BearerGate<Admins<C>, Clients<C>, Tenants<C>>>,
}

impl<C: Connection> AppState<C> {
    /// Wire every service to `db`. `home` is the database the
    /// connection was opened on.
    pub fn new(db: Surreal<C>, home: SchemaName, config: &AuthConfig) -> Result<Self, AuthError> {
        let tokens = TokenService::new(config)?;
        let credentials = CredentialStore::new(config);

        let admins = SurrealAdminUserRepository::new(db.clone());
        let clients = SurrealClientRepository::new(db.clone());
        let tenants = SurrealTenantRepositoryFactory::new(db.clone(), home.clone());
        let provisioner = SurrealSchemaProvisioner::new(db, home);

        Ok(Self {
            admins: Arc::new(AdminService::new(
                admins.clone(),
                credentials.clone(),
                tokens.clone(),
            )),
            clients: Arc::new(ClientService::new(
                clients.clone(),
                provisioner,
                tenants.clone(),
            )),
            client_users: Arc::new(ClientUserService::new(
                clients.clone(),
                tenants.clone(),
                credentials,
                tokens.clone(),
            )),
            gate: Arc::new(BearerGate::new(tokens, admins, clients, tenants)),
        })
    }
}

impl<C: Connection> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            admins: Arc::clone(&self.admins),
            clients: Arc::clone(&self.clients),
            client_users: Arc::clone(&self.client_users),
            gate: Arc::clone(&self.gate),
        }
    }
}
