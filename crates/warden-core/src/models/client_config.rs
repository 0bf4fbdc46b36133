//! Per-tenant settings document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Semi-structured key/value settings; one document per tenant schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub settings: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
