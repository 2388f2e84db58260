//! Error types for rlvis-state

use thiserror::Error;

/// Errors raised while connecting to or preparing the backing database
#[derive(Error, Debug)]
pub enum StateError {
    /// Database connection error
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Database query error
    #[error("Database query failed: {0}")]
    Query(String),

    /// Schema setup error
    #[error("Schema setup failed: {0}")]
    SchemaSetup(String),

    /// Configuration error (missing or malformed environment)
    #[error("Invalid store configuration: {0}")]
    Config(String),
}

impl From<surrealdb::Error> for StateError {
    fn from(err: surrealdb::Error) -> Self {
        StateError::Query(err.to_string())
    }
}

/// Errors surfaced by the [`crate::RunStore`] and [`crate::OwnerDirectory`] traits
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("run not found: {run_id}")]
    RunNotFound { run_id: String },

    /// An owner with this email is already registered
    #[error("owner already exists: {email}")]
    DuplicateOwner { email: String },

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid owner registration: {reason}")]
    InvalidRegistration { reason: String },

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_owner_names_the_email() {
        let err = StorageError::DuplicateOwner {
            email: "ada@example.com".to_string(),
        };
        assert!(err.to_string().contains("ada@example.com"));
    }

    #[test]
    fn run_not_found_names_the_id() {
        let err = StorageError::RunNotFound {
            run_id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "run not found: abc");
    }
}
