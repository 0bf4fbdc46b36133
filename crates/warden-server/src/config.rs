//! Server configuration loaded from the environment.

use thiserror::Error;
use warden_auth::AuthConfig;
use warden_core::models::schema::SchemaName;
use warden_db::DbConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub auth: AuthConfig,
    pub db: DbConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 9000,
            auth: AuthConfig::default(),
            db: DbConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// `WARDEN_JWT_SECRET` is required; everything else falls back to
    /// [`ServerConfig::default`]. `WARDEN_DB_DATABASE` may only contain
    /// ASCII letters, digits, `_` and `-`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        config.auth.jwt_secret = lookup("WARDEN_JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("WARDEN_JWT_SECRET"))?;
        if let Some(v) = lookup("WARDEN_TOKEN_LIFETIME_SECS") {
            config.auth.token_lifetime_secs = parse("WARDEN_TOKEN_LIFETIME_SECS", v)?;
        }
        config.auth.pepper = lookup("WARDEN_PASSWORD_PEPPER").filter(|s| !s.is_empty());

        if let Some(v) = lookup("WARDEN_HOST") {
            config.host = v;
        }
        if let Some(v) = lookup("WARDEN_PORT") {
            config.port = parse("WARDEN_PORT", v)?;
        }

        if let Some(v) = lookup("WARDEN_DB_URL") {
            config.db.url = v;
        }
        if let Some(v) = lookup("WARDEN_DB_NAMESPACE") {
            config.db.namespace = v;
        }
        if let Some(v) = lookup("WARDEN_DB_DATABASE") {
            // Tenant queries switch back to this database by name.
            if SchemaName::home(&v).is_err() {
                return Err(ConfigError::Invalid {
                    name: "WARDEN_DB_DATABASE",
                    value: v,
                });
            }
            config.db.database = v;
        }
        if let Some(v) = lookup("WARDEN_DB_USER") {
            config.db.username = v;
        }
        if let Some(v) = lookup("WARDEN_DB_PASSWORD") {
            config.db.password = v;
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
