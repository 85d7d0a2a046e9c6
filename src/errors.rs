//! Typed error hierarchy for the memory bank.
//!
//! Two top-level enums cover the two fallible subsystems:
//! - `MemoryError`: store access, schema migrations and entity operations
//! - `ConfigError`: environment configuration parsing

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the data-access layer.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Database not found at '{}'. Run 'clide init' to create it.", path.display())]
    StoreNotFound { path: PathBuf },

    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Invalid severity '{0}'. Valid values: critical, major, minor, trivial")]
    InvalidSeverity(String),

    #[error("Invalid {entity} status '{value}'")]
    InvalidStatus { entity: &'static str, value: String },

    #[error("Invalid work kind '{0}'. Valid values: story, defect")]
    InvalidWorkKind(String),

    #[error("Invalid priority {0}: must be between 1 and 5")]
    InvalidPriority(i64),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration {version} failed: {source}")]
    Migration {
        version: u32,
        #[source]
        source: rusqlite::Error,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Database(#[source] rusqlite::Error),
}

impl From<rusqlite::Error> for MemoryError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let detail = msg.clone().unwrap_or_else(|| e.to_string());
                MemoryError::Constraint(detail)
            }
            _ => MemoryError::Database(err),
        }
    }
}

pub type Result<T, E = MemoryError> = std::result::Result<T, E>;

/// Errors from reading process configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {var} value '{value}': expected a port number")]
    InvalidPort { var: &'static str, value: String },

    #[error("Invalid {var} value '{value}': expected true or false")]
    InvalidBool { var: &'static str, value: String },
}
