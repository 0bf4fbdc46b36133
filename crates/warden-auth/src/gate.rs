//! Bearer authentication for protected operations.
//!
//! The gate turns an `Authorization` header value into an
//! authenticated principal or an `Unauthorized` error. Nothing is
//! returned on the failure path, so callers cannot act on a partially
//! checked request.

use serde::Serialize;
use uuid::Uuid;
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::admin_user::AdminUser;
use warden_core::models::client::Client;
use warden_core::models::client_user::ClientUser;
use warden_core::repository::{
    AdminUserRepository, ClientRepository, ClientUserRepository, TenantRepositoryFactory,
};

use crate::service::conceal;
use crate::token::{TokenScope, TokenService};

const BEARER_PREFIX: &str = "Bearer ";

/// An admin user whose bearer token has been verified.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedAdmin {
    pub user: AdminUser,
}

impl AuthenticatedAdmin {
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

/// A client user whose bearer token has been verified against its
/// client's schema.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedClientUser {
    pub client: Client,
    pub user: ClientUser,
}

/// Split the token out of an `Authorization` header value.
pub fn extract_bearer_token(header: Option<&str>) -> WardenResult<&str> {
    let header = header.ok_or_else(|| WardenError::unauthorized("Authorization header required"))?;
    header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| WardenError::unauthorized("Invalid authorization header format"))
}

#[derive(Clone)]
pub struct BearerGate<A, C, T> {
    tokens: TokenService,
    admins: A,
    clients: C,
    tenants: T,
}

impl<A, C, T> BearerGate<A, C, T>
where
    A: AdminUserRepository,
    C: ClientRepository,
    T: TenantRepositoryFactory,
{
    pub fn new(tokens: TokenService, admins: A, clients: C, tenants: T) -> Self {
        Self {
            tokens,
            admins,
            clients,
            tenants,
        }
    }

    /// Verify the header and resolve the admin user it names.
    pub async fn authenticate_admin(&self, header: Option<&str>) -> WardenResult<AuthenticatedAdmin> {
        let (user_id, scope) = self.verify(header)?;
        if scope != TokenScope::Admin {
            return Err(WardenError::unauthorized("Invalid token"));
        }

        let user = self
            .admins
            .get_by_id(user_id)
            .await
            .map_err(conceal("resolve admin from token"))?
            .ok_or_else(|| WardenError::unauthorized("User not found"))?;

        Ok(AuthenticatedAdmin { user })
    }

    /// Verify the header and resolve the client user it names, inside
    /// the schema of the client named by the token scope.
    pub async fn authenticate_client_user(
        &self,
        header: Option<&str>,
    ) -> WardenResult<AuthenticatedClientUser> {
        let (user_id, scope) = self.verify(header)?;
        let TokenScope::Client(client_id) = scope else {
            return Err(WardenError::unauthorized("Invalid token"));
        };

        let client = self
            .clients
            .get_by_id(client_id)
            .await
            .map_err(conceal("resolve client from token"))?
            .ok_or_else(|| WardenError::unauthorized("Client not found"))?;

        let user = self
            .tenants
            .users(&client.schema_name)
            .get_by_id(user_id)
            .await
            .map_err(conceal("resolve client user from token"))?
            .ok_or_else(|| WardenError::unauthorized("User not found"))?;

        Ok(AuthenticatedClientUser { client, user })
    }

    fn verify(&self, header: Option<&str>) -> WardenResult<(Uuid, TokenScope)> {
        let token = extract_bearer_token(header)?;
        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Bearer token rejected");
            WardenError::from(e)
        })?;
        let scope = claims.scope().map_err(WardenError::from)?;
        Ok((claims.user_id, scope))
    }
}
