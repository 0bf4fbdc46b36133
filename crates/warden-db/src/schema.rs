//! Schema definitions and migration runner for SurrealDB.
//!
//! Two kinds of schema live here. The shared database gets versioned
//! migrations tracked in `_migration`. Every tenant database gets the
//! same fixed DDL, applied by the provisioner; it only uses
//! `IF NOT EXISTS` definitions so re-applying it is harmless.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

/// Tenant user table name inside a provisioned schema.
pub const TENANT_USER_TABLE: &str = "users";
/// Tenant config table name inside a provisioned schema.
pub const TENANT_CONFIG_TABLE: &str = "configs";

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "admin_users_and_clients",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: shared tables
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Admin users
-- =======================================================================
DEFINE TABLE admin_user SCHEMAFULL;
DEFINE FIELD username ON TABLE admin_user TYPE string;
DEFINE FIELD email ON TABLE admin_user TYPE string;
DEFINE FIELD password_hash ON TABLE admin_user TYPE string;
DEFINE FIELD created_at ON TABLE admin_user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE admin_user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_admin_user_username ON TABLE admin_user \
    COLUMNS username UNIQUE;
DEFINE INDEX idx_admin_user_email ON TABLE admin_user \
    COLUMNS email UNIQUE;

-- =======================================================================
-- Clients (tenants), owned by an admin user
-- =======================================================================
DEFINE TABLE client SCHEMAFULL;
DEFINE FIELD client_name ON TABLE client TYPE string;
DEFINE FIELD client_secret ON TABLE client TYPE string;
DEFINE FIELD owner_user_id ON TABLE client TYPE string;
DEFINE FIELD schema_name ON TABLE client TYPE string;
DEFINE FIELD created_at ON TABLE client TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE client TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_client_owner_name ON TABLE client \
    COLUMNS owner_user_id, client_name UNIQUE;
DEFINE INDEX idx_client_secret ON TABLE client \
    COLUMNS client_secret UNIQUE;
DEFINE INDEX idx_client_schema ON TABLE client \
    COLUMNS schema_name UNIQUE;
DEFINE INDEX idx_client_owner ON TABLE client COLUMNS owner_user_id;
";

// -----------------------------------------------------------------------
// Tenant schema, applied inside each client's database
// -----------------------------------------------------------------------

const TENANT_SCHEMA: &str = "\
DEFINE TABLE IF NOT EXISTS users SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS username ON TABLE users TYPE string;
DEFINE FIELD IF NOT EXISTS email ON TABLE users TYPE string;
DEFINE FIELD IF NOT EXISTS password_hash ON TABLE users TYPE string;
DEFINE FIELD IF NOT EXISTS created_at ON TABLE users TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS updated_at ON TABLE users TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_users_username ON TABLE users \
    COLUMNS username UNIQUE;
DEFINE INDEX IF NOT EXISTS idx_users_email ON TABLE users \
    COLUMNS email UNIQUE;

DEFINE TABLE IF NOT EXISTS configs SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS settings ON TABLE configs TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD IF NOT EXISTS updated_at ON TABLE configs TYPE datetime \
    DEFAULT time::now();
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending shared-database migrations.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;
    }

    Ok(())
}

/// DDL for the tables every tenant schema carries.
pub fn tenant_schema() -> &'static str {
    TENANT_SCHEMA
}
