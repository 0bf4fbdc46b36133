//! Tenant schema names.
//!
//! A [`SchemaName`] identifies the isolated namespace holding one
//! client's tables. It is derived from caller-supplied strings (owner
//! username and client name), so it is only constructible through
//! [`SchemaName::derive`], which sanitizes, or [`SchemaName::parse`],
//! which validates. Once constructed it contains nothing but
//! `[a-z0-9_]` and is safe to embed as a quoted identifier. The shared
//! database is the one exception: [`SchemaName::home`] also admits
//! upper case and `-`, still never a backtick.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Maximum characters kept from each caller-supplied component.
const PART_MAX_CHARS: usize = 24;
/// Hex characters of the disambiguating hash suffix.
const HASH_SUFFIX_CHARS: usize = 8;
const MAX_LEN: usize = 128;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid schema name: {0:?}")]
pub struct InvalidSchemaName(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaName(String);

impl SchemaName {
    /// Derive the schema name for `client_name` owned by `owner_username`.
    ///
    /// Format: `<owner>_<client>_client_<hash8>`. The readable parts are
    /// lowercased with every other byte replaced by `_`; the suffix is
    /// taken from SHA-256 over the exact inputs, so two pairs that
    /// sanitize to the same text still map to different schemas.
    pub fn derive(owner_username: &str, client_name: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(owner_username.as_bytes());
        hasher.update([0u8]);
        hasher.update(client_name.as_bytes());
        let digest = hex::encode(hasher.finalize());

        Self(format!(
            "{}_{}_client_{}",
            sanitize(owner_username),
            sanitize(client_name),
            &digest[..HASH_SUFFIX_CHARS],
        ))
    }

    /// Accept a previously derived name read back from storage.
    pub fn parse(raw: &str) -> Result<Self, InvalidSchemaName> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidSchemaName(raw.to_string()))
        }
    }

    /// Accept the name of the shared database the service connects to.
    ///
    /// Operators pick this name, so it may also use upper case and `-`.
    /// Backticks and every other byte stay out, keeping [`quoted`] safe.
    ///
    /// [`quoted`]: SchemaName::quoted
    pub fn home(raw: &str) -> Result<Self, InvalidSchemaName> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidSchemaName(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The schema as a backtick-quoted query identifier.
    ///
    /// This is the only place a schema name is turned into query text.
    pub fn quoted(&self) -> String {
        format!("`{}`", self.0)
    }

    /// Statement prefix that scopes the rest of a query to this schema.
    pub fn use_clause(&self) -> String {
        format!("USE DB {};", self.quoted())
    }
}

fn sanitize(part: &str) -> String {
    let cleaned: String = part
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '_'
            }
        })
        .take(PART_MAX_CHARS)
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SchemaName {
    type Error = InvalidSchemaName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SchemaName> for String {
    fn from(value: SchemaName) -> Self {
        value.0
    }
}
