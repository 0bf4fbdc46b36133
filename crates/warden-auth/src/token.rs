//! HS256 bearer token issuance and verification.
//!
//! Tokens are stateless: there is no revocation list and no refresh
//! flow. A token is valid until `exp`, with zero leeway.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

const ADMIN_SCOPE: &str = "admin";
const CLIENT_SCOPE_PREFIX: &str = "client:";

/// Which population a token was issued to.
///
/// Admin users and client users live in different stores, so a bare
/// user ID is ambiguous; the scope says where to look it up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScope {
    Admin,
    /// A user inside the schema of the given client.
    Client(Uuid),
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenScope::Admin => f.write_str(ADMIN_SCOPE),
            TokenScope::Client(id) => write!(f, "{CLIENT_SCOPE_PREFIX}{id}"),
        }
    }
}

impl FromStr for TokenScope {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ADMIN_SCOPE {
            return Ok(TokenScope::Admin);
        }
        s.strip_prefix(CLIENT_SCOPE_PREFIX)
            .and_then(|id| Uuid::parse_str(id).ok())
            .map(TokenScope::Client)
            .ok_or_else(|| AuthError::InvalidToken(format!("unknown scope {s:?}")))
    }
}

/// JWT claims embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Serialized as the UUID's canonical string.
    pub user_id: Uuid,
    /// `admin` or `client:<client_id>`.
    pub scope: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

impl TokenClaims {
    pub fn scope(&self) -> Result<TokenScope, AuthError> {
        self.scope.parse()
    }
}

/// A freshly signed token and its expiry.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies HS256 tokens with one shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime_secs: i64,
}

impl TokenService {
    /// Build the service. Fails if the secret is empty, so no token
    /// can ever be signed or accepted with a blank key.
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        if config.jwt_secret.is_empty() {
            return Err(AuthError::Configuration("JWT secret must not be empty".into()));
        }
        let lifetime_secs = i64::try_from(config.token_lifetime_secs)
            .map_err(|_| AuthError::Configuration("token lifetime out of range".into()))?;

        let secret = config.jwt_secret.as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetime_secs,
        })
    }

    /// Sign a token for `user_id` valid for the configured lifetime.
    pub fn issue(&self, user_id: Uuid, scope: TokenScope) -> Result<IssuedToken, AuthError> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            user_id,
            scope: scope.to_string(),
            iat: now,
            exp: now + self.lifetime_secs,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AuthError::Crypto("token expiry out of range".into()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature, algorithm and expiry, and return the claims.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}
