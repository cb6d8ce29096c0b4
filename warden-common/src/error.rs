// ================================================================
// File: warden-common/src/error.rs
// ================================================================

use thiserror::Error;

/// Failure of a capability (LLM-style) call. Never coerced into a verdict.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("Capability call timed out after {0} seconds")]
    Timeout(u64),

    #[error("Capability transport error: {0}")]
    Transport(String),

    #[error("Capability provider error: {0}")]
    Provider(String),

    #[error("Schema violation in '{schema}' at '{path}': {message}")]
    SchemaViolation {
        schema: String,
        path: String,
        message: String,
    },

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl CapabilityError {
    pub fn schema_violation(schema: &str, path: impl Into<String>, message: impl Into<String>) -> Self {
        CapabilityError::SchemaViolation {
            schema: schema.to_string(),
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Failure of a history/group/user store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    #[error("Classification failed: {0}")]
    Classification(CapabilityError),

    #[error("Judgment failed: {0}")]
    Judgment(CapabilityError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Store(StoreError::Database(err))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}
