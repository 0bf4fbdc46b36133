//! Database-specific error types and conversions.

use warden_core::error::WardenError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Invalid database configuration: {0}")]
    Config(String),

    /// The store aborted the transaction on a write conflict; the same
    /// statement may succeed (or hit a unique index) when sent again.
    #[error("Transaction conflict: {0}")]
    Retryable(String),

    #[error("Unique index {index} violated")]
    Conflict { index: String },

    #[error("Stored record is malformed: {0}")]
    Corrupt(String),
}

impl DbError {
    /// Classify an error returned by a write, either from sending the
    /// query or from `Response::check`.
    ///
    /// Unique-index rejections become [`DbError::Conflict`] so that the
    /// service layer can report them as conflicts instead of store
    /// failures. Concurrent writers touching the same index keys get
    /// [`DbError::Retryable`].
    pub fn from_statement(err: surrealdb::Error) -> Self {
        let text = err.to_string();
        if is_transaction_conflict(&text) {
            return DbError::Retryable(text);
        }
        if text.contains("already contains") {
            if let Some(index) = index_name(&text) {
                return DbError::Conflict { index };
            }
        }
        DbError::Surreal(err)
    }

    pub fn is_conflict_on(&self, index: &str) -> bool {
        matches!(self, DbError::Conflict { index: i } if i == index)
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::Retryable(_))
    }
}

fn is_transaction_conflict(text: &str) -> bool {
    text.contains("can be retried") || text.contains("Transaction conflict")
}

/// Pull the first backtick-quoted token, which is the index name in
/// SurrealDB's "Database index `idx` already contains ..." message.
fn index_name(text: &str) -> Option<String> {
    let start = text.find('`')? + 1;
    let len = text[start..].find('`')?;
    Some(text[start..start + len].to_string())
}

fn conflict_message(index: &str) -> &'static str {
    if index.ends_with("_owner_name") {
        "Client name already exists"
    } else if index.ends_with("_username") {
        "Username already exists"
    } else if index.ends_with("_email") {
        "Email already exists"
    } else {
        "Record already exists"
    }
}

impl From<DbError> for WardenError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict { index } => WardenError::conflict(conflict_message(&index)),
            other => WardenError::internal(other.to_string()),
        }
    }
}
