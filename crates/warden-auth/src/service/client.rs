//! Client (tenant) creation, listing and settings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::client::{Client, CreateClient};
use warden_core::models::client_config::ClientConfig;
use warden_core::models::schema::SchemaName;
use warden_core::repository::{
    ClientConfigRepository, ClientRepository, SchemaProvisioner, TenantRepositoryFactory,
};
use warden_core::validation;

use super::conceal;
use crate::gate::AuthenticatedAdmin;

#[derive(Debug, Deserialize)]
pub struct CreateClientInput {
    pub client_name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateClientOutput {
    pub client_id: Uuid,
    pub client_name: String,
    pub client_secret: String,
    pub schema_name: SchemaName,
}

pub struct ClientService<C, P, T> {
    clients: C,
    provisioner: P,
    tenants: T,
}

impl<C, P, T> ClientService<C, P, T>
where
    C: ClientRepository,
    P: SchemaProvisioner,
    T: TenantRepositoryFactory,
{
    pub fn new(clients: C, provisioner: P, tenants: T) -> Self {
        Self {
            clients,
            provisioner,
            tenants,
        }
    }

    /// Create a client owned by `admin` and provision its schema.
    ///
    /// The client is only returned once its schema exists and holds the
    /// tenant tables. If provisioning fails, the schema and the client
    /// row are removed again.
    pub async fn create_client(
        &self,
        admin: &AuthenticatedAdmin,
        input: CreateClientInput,
    ) -> WardenResult<CreateClientOutput> {
        validation::validate_client_name(&input.client_name)?;

        let existing = self
            .clients
            .get_by_name_for_owner(&input.client_name, admin.id())
            .await
            .map_err(conceal("create client"))?;
        if existing.is_some() {
            return Err(WardenError::conflict("Client name already exists"));
        }

        let schema_name = SchemaName::derive(&admin.user.username, &input.client_name);
        let client = self
            .clients
            .create(CreateClient {
                client_name: input.client_name,
                owner_user_id: admin.id(),
                schema_name,
            })
            .await
            .map_err(conceal("create client"))?;

        if let Err(err) = self.provision(&client.schema_name).await {
            tracing::error!(
                client_id = %client.id,
                schema = %client.schema_name,
                error = %err,
                "Schema provisioning failed, rolling back client"
            );
            self.compensate(&client).await;
            return Err(WardenError::internal("Failed to initialize client schema"));
        }

        tracing::info!(
            client_id = %client.id,
            owner_user_id = %client.owner_user_id,
            schema = %client.schema_name,
            "Client created"
        );

        Ok(CreateClientOutput {
            client_id: client.id,
            client_name: client.client_name,
            client_secret: client.client_secret,
            schema_name: client.schema_name,
        })
    }

    /// Clients owned by `admin`, oldest first. Empty when there are none.
    pub async fn list_clients(&self, admin: &AuthenticatedAdmin) -> WardenResult<Vec<Client>> {
        self.clients
            .list_by_owner(admin.id())
            .await
            .map_err(conceal("list clients"))
    }

    /// The settings document of a client `admin` owns. An unwritten
    /// document reads as an empty object.
    pub async fn client_config(
        &self,
        admin: &AuthenticatedAdmin,
        client_id: Uuid,
    ) -> WardenResult<ClientConfig> {
        let client = self.find_owned_client(admin, client_id).await?;
        let config = self
            .tenants
            .configs(&client.schema_name)
            .get()
            .await
            .map_err(conceal("read client config"))?;

        Ok(config.unwrap_or_else(|| ClientConfig {
            settings: serde_json::Value::Object(Default::default()),
            updated_at: client.created_at,
        }))
    }

    /// Replace the settings document of a client `admin` owns.
    /// `settings` must be a JSON object.
    pub async fn update_client_config(
        &self,
        admin: &AuthenticatedAdmin,
        client_id: Uuid,
        settings: serde_json::Value,
    ) -> WardenResult<ClientConfig> {
        if !settings.is_object() {
            return Err(WardenError::validation("settings must be a JSON object"));
        }
        let client = self.find_owned_client(admin, client_id).await?;
        let config = self
            .tenants
            .configs(&client.schema_name)
            .put(settings)
            .await
            .map_err(conceal("update client config"))?;

        tracing::info!(client_id = %client.id, "Client config updated");
        Ok(config)
    }

    /// Another admin's client reads as missing.
    async fn find_owned_client(
        &self,
        admin: &AuthenticatedAdmin,
        client_id: Uuid,
    ) -> WardenResult<Client> {
        self.clients
            .get_by_id(client_id)
            .await
            .map_err(conceal("find client"))?
            .filter(|client| client.owner_user_id == admin.id())
            .ok_or_else(|| WardenError::not_found("Client not found"))
    }

    async fn provision(&self, schema: &SchemaName) -> WardenResult<()> {
        self.provisioner.create_schema(schema).await?;
        self.provisioner.migrate_tenant_tables(schema).await
    }

    async fn compensate(&self, client: &Client) {
        if let Err(e) = self.provisioner.drop_schema(&client.schema_name).await {
            tracing::warn!(schema = %client.schema_name, error = %e, "Failed to drop schema");
        }
        if let Err(e) = self.clients.delete(client.id).await {
            tracing::warn!(client_id = %client.id, error = %e, "Failed to delete client row");
        }
    }
}
