//! Client (tenant) domain model.
//!
//! A client isolates its own end-users under a dedicated schema. The
//! client secret is generated by the repository when the row is first
//! persisted and is the only thing end-users present to log in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::SchemaName;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    /// Unique per owning admin user, not globally.
    pub client_name: String,
    /// 32 random bytes, hex-encoded.
    pub client_secret: String,
    pub owner_user_id: Uuid,
    pub schema_name: SchemaName,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a client. No secret: the store makes one.
#[derive(Debug, Clone)]
pub struct CreateClient {
    pub client_name: String,
    pub owner_user_id: Uuid,
    pub schema_name: SchemaName,
}
