//! Client user domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An end-user belonging to exactly one client's schema.
///
/// Same shape as an admin user, but stored in the tenant's own `users`
/// table: usernames and emails are only unique within that schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateClientUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}
