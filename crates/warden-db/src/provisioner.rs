//! SurrealDB implementation of [`SchemaProvisioner`].
//!
//! Each tenant schema is a database inside the service namespace. The
//! shared tables live in the connection's own ("home") database, so any
//! statement that enters a tenant database switches back before the
//! query ends.

use surrealdb::{Connection, Surreal};
use warden_core::error::WardenResult;
use warden_core::models::schema::SchemaName;
use warden_core::repository::SchemaProvisioner;

use crate::error::DbError;
use crate::schema::tenant_schema;

/// Result index of the first statement of a [`scoped`] body.
pub(crate) const SCOPED_BODY: usize = 1;

/// Wrap `body` so it executes inside `schema`, then return to `home`.
pub(crate) fn scoped(schema: &SchemaName, home: &SchemaName, body: &str) -> String {
    format!("{}\n{}\n{}", schema.use_clause(), body, home.use_clause())
}

#[derive(Clone)]
pub struct SurrealSchemaProvisioner<C: Connection> {
    db: Surreal<C>,
    home: SchemaName,
}

impl<C: Connection> SurrealSchemaProvisioner<C> {
    /// `home` is the database the connection was opened on.
    pub fn new(db: Surreal<C>, home: SchemaName) -> Self {
        Self { db, home }
    }
}

impl<C: Connection> SchemaProvisioner for SurrealSchemaProvisioner<C> {
    async fn create_schema(&self, schema: &SchemaName) -> WardenResult<()> {
        self.db
            .query(format!("DEFINE DATABASE IF NOT EXISTS {};", schema.quoted()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;
        tracing::debug!(schema = %schema, "Tenant schema defined");
        Ok(())
    }

    async fn migrate_tenant_tables(&self, schema: &SchemaName) -> WardenResult<()> {
        self.db
            .query(scoped(schema, &self.home, tenant_schema()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Migration(format!("tenant schema {schema}: {e}")))?;
        tracing::debug!(schema = %schema, "Tenant tables migrated");
        Ok(())
    }

    async fn drop_schema(&self, schema: &SchemaName) -> WardenResult<()> {
        self.db
            .query(format!("REMOVE DATABASE IF EXISTS {};", schema.quoted()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;
        tracing::debug!(schema = %schema, "Tenant schema removed");
        Ok(())
    }

    async fn schema_exists(&self, schema: &SchemaName) -> WardenResult<bool> {
        let mut result = self
            .db
            .query("INFO FOR NS")
            .await
            .map_err(DbError::from)?;
        let info: Option<serde_json::Value> = result.take(0).map_err(DbError::from)?;

        Ok(info
            .as_ref()
            .and_then(|i| i.get("databases"))
            .and_then(|d| d.as_object())
            .is_some_and(|dbs| dbs.contains_key(schema.as_str())))
    }
}
