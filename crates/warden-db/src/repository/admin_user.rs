//! SurrealDB implementation of [`AdminUserRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::admin_user::{AdminUser, CreateAdminUser};
use warden_core::repository::AdminUserRepository;

use crate::error::DbError;
use crate::repository::{CountRow, WRITE_ATTEMPTS, parse_record_id};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct AdminUserRow {
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AdminUserRowWithId {
    record_id: String,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AdminUserRow {
    fn into_admin_user(self, id: Uuid) -> AdminUser {
        AdminUser {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl AdminUserRowWithId {
    fn try_into_admin_user(self) -> Result<AdminUser, DbError> {
        Ok(AdminUser {
            id: parse_record_id(&self.record_id)?,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub struct SurrealAdminUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealAdminUserRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealAdminUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_one(&self, field: &'static str, value: &str) -> WardenResult<Option<AdminUser>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM admin_user \
             WHERE {field} = $value LIMIT 1"
        );
        let mut result = self
            .db
            .query(query)
            .bind(("value", value.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdminUserRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|row| row.try_into_admin_user().map_err(Into::into))
            .transpose()
    }

    async fn insert(&self, id: Uuid, input: &CreateAdminUser) -> Result<AdminUser, DbError> {
        let mut result = self
            .db
            .query(
                "CREATE type::record('admin_user', $id) SET \
                 username = $username, email = $email, \
                 password_hash = $password_hash",
            )
            .bind(("id", id.to_string()))
            .bind(("username", input.username.clone()))
            .bind(("email", input.email.clone()))
            .bind(("password_hash", input.password_hash.clone()))
            .await
            .map_err(DbError::from_statement)?
            .check()
            .map_err(DbError::from_statement)?;

        let rows: Vec<AdminUserRow> = result.take(0)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::Corrupt(format!("admin_user {id} not returned by CREATE")))?;

        Ok(row.into_admin_user(id))
    }

    async fn count_where(&self, field: &'static str, value: &str) -> WardenResult<bool> {
        let query = format!(
            "SELECT count() AS total FROM admin_user \
             WHERE {field} = $value GROUP ALL"
        );
        let mut result = self
            .db
            .query(query)
            .bind(("value", value.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().is_some_and(|r| r.total > 0))
    }
}

impl<C: Connection> AdminUserRepository for SurrealAdminUserRepository<C> {
    async fn create(&self, input: CreateAdminUser) -> WardenResult<AdminUser> {
        let id = Uuid::new_v4();
        let mut attempt = 1;
        loop {
            match self.insert(id, &input).await {
                Err(e) if e.is_retryable() && attempt < WRITE_ATTEMPTS => {
                    tracing::debug!(attempt, "admin_user insert hit a write conflict, retrying");
                    attempt += 1;
                }
                other => return Ok(other?),
            }
        }
    }

    async fn get_by_id(&self, id: Uuid) -> WardenResult<Option<AdminUser>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('admin_user', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdminUserRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(|row| row.into_admin_user(id)))
    }

    async fn get_by_username(&self, username: &str) -> WardenResult<Option<AdminUser>> {
        self.find_one("username", username).await
    }

    async fn get_by_email(&self, email: &str) -> WardenResult<Option<AdminUser>> {
        self.find_one("email", email).await
    }

    async fn username_exists(&self, username: &str) -> WardenResult<bool> {
        self.count_where("username", username).await
    }

    async fn email_exists(&self, email: &str) -> WardenResult<bool> {
        self.count_where("email", email).await
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: String,
    ) -> WardenResult<Option<AdminUser>> {
        let mut result = self
            .db
            .query(
                "UPDATE type::record('admin_user', $id) SET \
                 password_hash = $password_hash, updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        let rows: Vec<AdminUserRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(|row| row.into_admin_user(id)))
    }

    async fn delete(&self, id: Uuid) -> WardenResult<()> {
        // Owned client rows go in the same transaction. Tenant databases
        // are left in place.
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE client WHERE owner_user_id = $id; \
                 DELETE type::record('admin_user', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        Ok(())
    }
}
