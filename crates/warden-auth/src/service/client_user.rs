//! Client-user signup, listing and login.
//!
//! Every operation first resolves the client, then works through a
//! repository bound to that client's schema. Nothing here can reach
//! another tenant's users.

use serde::Deserialize;
use uuid::Uuid;
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::client::Client;
use warden_core::models::client_user::{ClientUser, CreateClientUser};
use warden_core::repository::{ClientRepository, ClientUserRepository, TenantRepositoryFactory};
use warden_core::validation;

use super::admin::{LoginOutput, UserInfo};
use super::conceal;
use crate::error::AuthError;
use crate::gate::AuthenticatedAdmin;
use crate::password::CredentialStore;
use crate::token::{TokenScope, TokenService};

#[derive(Deserialize)]
pub struct CreateClientUserInput {
    pub client_id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ClientLoginInput {
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

pub struct ClientUserService<C, T> {
    clients: C,
    tenants: T,
    credentials: CredentialStore,
    tokens: TokenService,
}

impl<C, T> ClientUserService<C, T>
where
    C: ClientRepository,
    T: TenantRepositoryFactory,
{
    pub fn new(clients: C, tenants: T, credentials: CredentialStore, tokens: TokenService) -> Self {
        Self {
            clients,
            tenants,
            credentials,
            tokens,
        }
    }

    /// Register a user inside the schema of a client `admin` owns.
    ///
    /// Uniqueness is per schema: the same username may exist under
    /// other clients.
    pub async fn create_client_user(
        &self,
        admin: &AuthenticatedAdmin,
        input: CreateClientUserInput,
    ) -> WardenResult<ClientUser> {
        let client = self.find_owned_client(admin, input.client_id).await?;

        validation::validate_username(&input.username)?;
        validation::validate_email(&input.email)?;
        self.credentials.check_policy(&input.password)?;

        let users = self.tenants.users(&client.schema_name);
        if users
            .username_exists(&input.username)
            .await
            .map_err(conceal("client user signup"))?
        {
            return Err(WardenError::conflict("Username already exists"));
        }
        if users
            .email_exists(&input.email)
            .await
            .map_err(conceal("client user signup"))?
        {
            return Err(WardenError::conflict("Email already exists"));
        }

        let password_hash = self
            .credentials
            .hash(&input.password)
            .map_err(WardenError::from)
            .map_err(conceal("client user signup"))?;

        let user = users
            .create(CreateClientUser {
                username: input.username,
                email: input.email,
                password_hash,
            })
            .await
            .map_err(conceal("client user signup"))?;

        tracing::info!(
            client_id = %client.id,
            user_id = %user.id,
            created_by = %admin.id(),
            "Client user registered"
        );
        Ok(user)
    }

    /// Users of a client `admin` owns, oldest first. Another admin's
    /// client reads as missing.
    pub async fn list_client_users(
        &self,
        admin: &AuthenticatedAdmin,
        client_id: Uuid,
    ) -> WardenResult<Vec<ClientUser>> {
        let client = self.find_owned_client(admin, client_id).await?;
        self.tenants
            .users(&client.schema_name)
            .list()
            .await
            .map_err(conceal("list client users"))
    }

    /// Resolve the client by secret, check the user's credentials in
    /// that client's schema, and issue a client-scoped token.
    pub async fn authenticate_client_user(
        &self,
        input: ClientLoginInput,
    ) -> WardenResult<LoginOutput> {
        validation::require("client_secret", &input.client_secret)?;
        validation::require("username", &input.username)?;
        validation::require("password", &input.password)?;

        let client = self
            .clients
            .get_by_secret(&input.client_secret)
            .await
            .map_err(conceal("client user login"))?
            .ok_or_else(|| WardenError::not_found("Client not found"))?;

        let user = self
            .tenants
            .users(&client.schema_name)
            .get_by_username(&input.username)
            .await
            .map_err(conceal("client user login"))?;

        let Some(user) = user else {
            tracing::warn!(client_id = %client.id, "Client user login failed: unknown user");
            return Err(AuthError::InvalidCredentials.into());
        };

        let valid = self
            .credentials
            .verify(&user.password_hash, &input.password)
            .map_err(WardenError::from)
            .map_err(conceal("client user login"))?;
        if !valid {
            tracing::warn!(
                client_id = %client.id,
                user_id = %user.id,
                "Client user login failed: wrong password"
            );
            return Err(AuthError::InvalidCredentials.into());
        }

        let issued = self
            .tokens
            .issue(user.id, TokenScope::Client(client.id))
            .map_err(WardenError::from)
            .map_err(conceal("client user login"))?;

        tracing::info!(client_id = %client.id, user_id = %user.id, "Client user logged in");

        Ok(LoginOutput {
            token: issued.token,
            expires_at: issued.expires_at,
            user: UserInfo {
                id: user.id,
                username: user.username,
                email: user.email,
            },
        })
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
}
