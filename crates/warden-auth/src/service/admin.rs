//! Admin user signup and login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::admin_user::CreateAdminUser;
use warden_core::repository::AdminUserRepository;
use warden_core::validation;

use super::conceal;
use crate::error::AuthError;
use crate::password::CredentialStore;
use crate::token::{TokenScope, TokenService};

#[derive(Deserialize)]
pub struct SignupInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupOutput {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Public view of an authenticated user.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Successful login result, for admins and client users alike.
#[derive(Debug, Serialize)]
pub struct LoginOutput {
    /// Signed HS256 bearer token.
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserInfo,
}

pub struct AdminService<A: AdminUserRepository> {
    users: A,
    credentials: CredentialStore,
    tokens: TokenService,
}

impl<A: AdminUserRepository> AdminService<A> {
    pub fn new(users: A, credentials: CredentialStore, tokens: TokenService) -> Self {
        Self {
            users,
            credentials,
            tokens,
        }
    }

    /// Register a new admin user.
    pub async fn signup(&self, input: SignupInput) -> WardenResult<SignupOutput> {
        validation::validate_username(&input.username)?;
        validation::validate_email(&input.email)?;
        self.credentials.check_policy(&input.password)?;

        // Friendly pre-checks; the unique indexes decide races.
        if self
            .users
            .username_exists(&input.username)
            .await
            .map_err(conceal("admin signup"))?
        {
            return Err(WardenError::conflict("Username already exists"));
        }
        if self
            .users
            .email_exists(&input.email)
            .await
            .map_err(conceal("admin signup"))?
        {
            return Err(WardenError::conflict("Email already exists"));
        }

        let password_hash = self
            .credentials
            .hash(&input.password)
            .map_err(WardenError::from)
            .map_err(conceal("admin signup"))?;

        let user = self
            .users
            .create(CreateAdminUser {
                username: input.username,
                email: input.email,
                password_hash,
            })
            .await
            .map_err(conceal("admin signup"))?;

        tracing::info!(user_id = %user.id, username = %user.username, "Admin user registered");

        Ok(SignupOutput {
            user_id: user.id,
            username: user.username,
            email: user.email,
        })
    }

    /// Check credentials and issue an admin-scoped token.
    ///
    /// Unknown usernames and wrong passwords fail identically.
    pub async fn login(&self, input: LoginInput) -> WardenResult<LoginOutput> {
        validation::require("username", &input.username)?;
        validation::require("password", &input.password)?;

        let user = self
            .users
            .get_by_username(&input.username)
            .await
            .map_err(conceal("admin login"))?;

        let Some(user) = user else {
            tracing::warn!(username = %input.username, "Admin login failed: unknown user");
            return Err(AuthError::InvalidCredentials.into());
        };

        let valid = self
            .credentials
            .verify(&user.password_hash, &input.password)
            .map_err(WardenError::from)
            .map_err(conceal("admin login"))?;
        if !valid {
            tracing::warn!(user_id = %user.id, "Admin login failed: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let issued = self
            .tokens
            .issue(user.id, TokenScope::Admin)
            .map_err(WardenError::from)
            .map_err(conceal("admin login"))?;

        tracing::info!(user_id = %user.id, "Admin user logged in");

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
}
