//! SurrealDB implementation of [`ClientUserRepository`].
//!
//! A repository instance is bound to one tenant schema at construction.
//! Every query it issues enters that schema first and returns to the
//! home database afterwards, so the statement results start at index 1.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::client_user::{ClientUser, CreateClientUser};
use warden_core::models::schema::SchemaName;
use warden_core::repository::ClientUserRepository;

use crate::error::DbError;
use crate::provisioner::{SCOPED_BODY, scoped};
use crate::repository::{CountRow, WRITE_ATTEMPTS, parse_record_id};

#[derive(Debug, SurrealValue)]
struct ClientUserRow {
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ClientUserRowWithId {
    record_id: String,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ClientUserRow {
    fn into_client_user(self, id: Uuid) -> ClientUser {
        ClientUser {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl ClientUserRowWithId {
    fn try_into_client_user(self) -> Result<ClientUser, DbError> {
        Ok(ClientUser {
            id: parse_record_id(&self.record_id)?,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct SurrealClientUserRepository<C: Connection> {
    db: Surreal<C>,
    schema: SchemaName,
    home: SchemaName,
}

impl<C: Connection> SurrealClientUserRepository<C> {
    pub fn new(db: Surreal<C>, schema: SchemaName, home: SchemaName) -> Self {
        Self { db, schema, home }
    }

    fn sql(&self, body: &str) -> String {
        scoped(&self.schema, &self.home, body)
    }

    async fn find_one(&self, field: &'static str, value: &str) -> WardenResult<Option<ClientUser>> {
        let body = format!(
            "SELECT meta::id(id) AS record_id, * FROM users \
             WHERE {field} = $value LIMIT 1;"
        );
        let mut result = self
            .db
            .query(self.sql(&body))
            .bind(("value", value.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        let rows: Vec<ClientUserRowWithId> = result.take(SCOPED_BODY).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|row| row.try_into_client_user().map_err(Into::into))
            .transpose()
    }

    async fn insert(&self, id: Uuid, input: &CreateClientUser) -> Result<ClientUser, DbError> {
        let mut result = self
            .db
            .query(self.sql(
                "CREATE type::record('users', $id) SET \
                 username = $username, email = $email, \
                 password_hash = $password_hash;",
            ))
            .bind(("id", id.to_string()))
            .bind(("username", input.username.clone()))
            .bind(("email", input.email.clone()))
            .bind(("password_hash", input.password_hash.clone()))
            .await
            .map_err(DbError::from_statement)?
            .check()
            .map_err(DbError::from_statement)?;

        let rows: Vec<ClientUserRow> = result.take(SCOPED_BODY)?;
        let row = rows.into_iter().next().ok_or_else(|| {
            DbError::Corrupt(format!("user {id} not returned by CREATE in {}", self.schema))
        })?;

        Ok(row.into_client_user(id))
    }

    async fn count_where(&self, field: &'static str, value: &str) -> WardenResult<bool> {
        let body = format!("SELECT count() AS total FROM users WHERE {field} = $value GROUP ALL;");
        let mut result = self
            .db
            .query(self.sql(&body))
            .bind(("value", value.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        let rows: Vec<CountRow> = result.take(SCOPED_BODY).map_err(DbError::from)?;
        Ok(rows.first().is_some_and(|r| r.total > 0))
    }
}

impl<C: Connection> ClientUserRepository for SurrealClientUserRepository<C> {
    fn schema(&self) -> &SchemaName {
        &self.schema
    }

    async fn create(&self, input: CreateClientUser) -> WardenResult<ClientUser> {
        let id = Uuid::new_v4();
        let mut attempt = 1;
        loop {
            match self.insert(id, &input).await {
                Err(e) if e.is_retryable() && attempt < WRITE_ATTEMPTS => {
                    tracing::debug!(
                        attempt,
                        schema = %self.schema,
                        "users insert hit a write conflict, retrying"
                    );
                    attempt += 1;
                }
                other => return Ok(other?),
            }
        }
    }

    async fn get_by_id(&self, id: Uuid) -> WardenResult<Option<ClientUser>> {
        let mut result = self
            .db
            .query(self.sql("SELECT * FROM type::record('users', $id);"))
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        let rows: Vec<ClientUserRow> = result.take(SCOPED_BODY).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(|row| row.into_client_user(id)))
    }

    async fn get_by_username(&self, username: &str) -> WardenResult<Option<ClientUser>> {
        self.find_one("username", username).await
    }

    async fn get_by_email(&self, email: &str) -> WardenResult<Option<ClientUser>> {
        self.find_one("email", email).await
    }

    async fn username_exists(&self, username: &str) -> WardenResult<bool> {
        self.count_where("username", username).await
    }

    async fn email_exists(&self, email: &str) -> WardenResult<bool> {
        self.count_where("email", email).await
    }

    async fn list(&self) -> WardenResult<Vec<ClientUser>> {
        let mut result = self
            .db
            .query(self.sql(
                "SELECT meta::id(id) AS record_id, * FROM users \
                 ORDER BY created_at ASC;",
            ))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        let rows: Vec<ClientUserRowWithId> = result.take(SCOPED_BODY).map_err(DbError::from)?;
        let users = rows
            .into_iter()
            .map(ClientUserRowWithId::try_into_client_user)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}
