//! SurrealDB implementation of [`ClientConfigRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use warden_core::error::WardenResult;
use warden_core::models::client_config::ClientConfig;
use warden_core::models::schema::SchemaName;
use warden_core::repository::ClientConfigRepository;

use crate::error::DbError;
use crate::provisioner::{SCOPED_BODY, scoped};

/// The settings document has a fixed record key inside each schema.
const SETTINGS_KEY: &str = "settings";

#[derive(Debug, SurrealValue)]
struct ConfigRow {
    settings: serde_json::Value,
    updated_at: DateTime<Utc>,
}

impl From<ConfigRow> for ClientConfig {
    fn from(row: ConfigRow) -> Self {
        Self {
            settings: row.settings,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct SurrealClientConfigRepository<C: Connection> {
    db: Surreal<C>,
    schema: SchemaName,
    home: SchemaName,
}

impl<C: Connection> SurrealClientConfigRepository<C> {
    pub fn new(db: Surreal<C>, schema: SchemaName, home: SchemaName) -> Self {
        Self { db, schema, home }
    }
}

impl<C: Connection> ClientConfigRepository for SurrealClientConfigRepository<C> {
    async fn get(&self) -> WardenResult<Option<ClientConfig>> {
        let mut result = self
            .db
            .query(scoped(
                &self.schema,
                &self.home,
                "SELECT settings, updated_at FROM type::record('configs', $key);",
            ))
            .bind(("key", SETTINGS_KEY))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        let rows: Vec<ConfigRow> = result.take(SCOPED_BODY).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(ClientConfig::from))
    }

    async fn put(&self, settings: serde_json::Value) -> WardenResult<ClientConfig> {
        let mut result = self
            .db
            .query(scoped(
                &self.schema,
                &self.home,
                "UPSERT type::record('configs', $key) SET \
                 settings = $settings, updated_at = time::now();",
            ))
            .bind(("key", SETTINGS_KEY))
            .bind(("settings", settings))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        let rows: Vec<ConfigRow> = result.take(SCOPED_BODY).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| {
            DbError::Corrupt(format!("settings not returned by UPSERT in {}", self.schema))
        })?;
        Ok(row.into())
    }
}
