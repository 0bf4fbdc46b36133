//! The single SurrealDB connection Warden runs on.
//!
//! One namespace holds everything. The configured database inside it
//! carries `admin_user` and `client`; every client gets a sibling
//! database of its own, reached over this same connection.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;
use warden_core::models::schema::SchemaName;

use crate::error::DbError;

#[derive(Debug, Clone)]
pub struct DbConfig {
    /// `host:port` of the SurrealDB WebSocket endpoint.
    pub url: String,
    /// Namespace holding the shared database and every tenant schema.
    pub namespace: String,
    /// Shared database. ASCII letters, digits, `_` and `-` only.
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "warden".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// An open connection plus the name of the database it rests on
/// between tenant queries.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
    home: SchemaName,
}

impl DbManager {
    /// Open the connection and park it on the shared database.
    ///
    /// Signs in as root because provisioning a client defines a new
    /// database in the namespace.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        let home = SchemaName::home(&config.database).map_err(|_| {
            DbError::Config(format!(
                "database {:?} may only contain ASCII letters, digits, '_' and '-'",
                config.database
            ))
        })?;

        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Opening Warden store"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(&config.namespace).use_db(home.as_str()).await?;

        info!(database = %home, "Warden store ready");
        Ok(Self { db, home })
    }

    /// Handle shared by every repository and the provisioner.
    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }

    /// Database every tenant-scoped query returns to.
    pub fn home(&self) -> &SchemaName {
        &self.home
    }
}
