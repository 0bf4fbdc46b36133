//! SurrealDB implementation of [`ClientRepository`].

use chrono::{DateTime, Utc};
use rand::Rng;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::client::{Client, CreateClient};
use warden_core::models::schema::SchemaName;
use warden_core::repository::ClientRepository;

use crate::error::DbError;
use crate::repository::{WRITE_ATTEMPTS, parse_record_id};

/// Collisions on a 256-bit secret mean a broken RNG, not bad luck; a
/// couple of retries is plenty.
const SECRET_ATTEMPTS: usize = 3;
const SECRET_INDEX: &str = "idx_client_secret";

#[derive(Debug, SurrealValue)]
struct ClientRow {
    client_name: String,
    client_secret: String,
    owner_user_id: String,
    schema_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ClientRowWithId {
    record_id: String,
    client_name: String,
    client_secret: String,
    owner_user_id: String,
    schema_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn build_client(
    id: Uuid,
    client_name: String,
    client_secret: String,
    owner_user_id: &str,
    schema_name: &str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Result<Client, DbError> {
    let owner_user_id = Uuid::parse_str(owner_user_id)
        .map_err(|e| DbError::Corrupt(format!("invalid owner UUID: {e}")))?;
    let schema_name =
        SchemaName::parse(schema_name).map_err(|e| DbError::Corrupt(e.to_string()))?;
    Ok(Client {
        id,
        client_name,
        client_secret,
        owner_user_id,
        schema_name,
        created_at,
        updated_at,
    })
}

impl ClientRow {
    fn into_client(self, id: Uuid) -> Result<Client, DbError> {
        build_client(
            id,
            self.client_name,
            self.client_secret,
            &self.owner_user_id,
            &self.schema_name,
            self.created_at,
            self.updated_at,
        )
    }
}

impl ClientRowWithId {
    fn try_into_client(self) -> Result<Client, DbError> {
        let id = parse_record_id(&self.record_id)?;
        build_client(
            id,
            self.client_name,
            self.client_secret,
            &self.owner_user_id,
            &self.schema_name,
            self.created_at,
            self.updated_at,
        )
    }
}

/// 32 random bytes, hex-encoded.
fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

pub struct SurrealClientRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealClientRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealClientRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn insert(&self, id: Uuid, input: &CreateClient) -> Result<Client, DbError> {
        let mut result = self
            .db
            .query(
                "CREATE type::record('client', $id) SET \
                 client_name = $client_name, client_secret = $client_secret, \
                 owner_user_id = $owner_user_id, schema_name = $schema_name",
            )
            .bind(("id", id.to_string()))
            .bind(("client_name", input.client_name.clone()))
            .bind(("client_secret", generate_secret()))
            .bind(("owner_user_id", input.owner_user_id.to_string()))
            .bind(("schema_name", input.schema_name.to_string()))
            .await
            .map_err(DbError::from_statement)?
            .check()
            .map_err(DbError::from_statement)?;

        let rows: Vec<ClientRow> = result.take(0)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::Corrupt(format!("client {id} not returned by CREATE")))?;
        row.into_client(id)
    }

    async fn select_many(
        &self,
        filter: &'static str,
        binding: (&'static str, String),
    ) -> WardenResult<Vec<Client>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM client \
             WHERE {filter} ORDER BY created_at ASC"
        );
        let mut result = self
            .db
            .query(query)
            .bind(binding)
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ClientRowWithId> = result.take(0).map_err(DbError::from)?;
        let clients = rows
            .into_iter()
            .map(ClientRowWithId::try_into_client)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(clients)
    }
}

impl<C: Connection> ClientRepository for SurrealClientRepository<C> {
    async fn create(&self, input: CreateClient) -> WardenResult<Client> {
        let id = Uuid::new_v4();
        let mut attempt = 1;
        loop {
            match self.insert(id, &input).await {
                Err(e) if e.is_conflict_on(SECRET_INDEX) && attempt < SECRET_ATTEMPTS => {
                    tracing::warn!(attempt, "Generated client secret collided, retrying");
                    attempt += 1;
                }
                Err(e) if e.is_retryable() && attempt < WRITE_ATTEMPTS => {
                    tracing::debug!(attempt, "client insert hit a write conflict, retrying");
                    attempt += 1;
                }
                other => return Ok(other?),
            }
        }
    }

    async fn get_by_id(&self, id: Uuid) -> WardenResult<Option<Client>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('client', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ClientRow> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|row| row.into_client(id).map_err(Into::into))
            .transpose()
    }

    async fn get_by_secret(&self, client_secret: &str) -> WardenResult<Option<Client>> {
        let mut clients = self
            .select_many("client_secret = $value", ("value", client_secret.to_string()))
            .await?;
        Ok(clients.pop())
    }

    async fn get_by_name_for_owner(
        &self,
        client_name: &str,
        owner_user_id: Uuid,
    ) -> WardenResult<Option<Client>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM client \
                 WHERE owner_user_id = $owner_user_id AND client_name = $client_name",
            )
            .bind(("owner_user_id", owner_user_id.to_string()))
            .bind(("client_name", client_name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ClientRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|row| row.try_into_client().map_err(Into::into))
            .transpose()
    }

    async fn list_by_owner(&self, owner_user_id: Uuid) -> WardenResult<Vec<Client>> {
        self.select_many(
            "owner_user_id = $value",
            ("value", owner_user_id.to_string()),
        )
        .await
    }

    async fn delete(&self, id: Uuid) -> WardenResult<()> {
        self.db
            .query("DELETE type::record('client', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_64_hex_chars() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(secret, generate_secret());
    }
}
