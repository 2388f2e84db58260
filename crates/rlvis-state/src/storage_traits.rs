//! Storage trait definitions for RL-Vis
//!
//! These traits define the persistence boundary consumed by the engine:
//! - `RunStore`: saved runs (opaque record payload keyed by owner and name)
//! - `OwnerDirectory`: owner registration and credential checks
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Unique identifier for a saved run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new random RunId
    pub fn new() -> Self {
        RunId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RunId {
    fn from(s: &str) -> Self {
        RunId(s.to_string())
    }
}

/// Opaque owner identity issued by an [`OwnerDirectory`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new() -> Self {
        OwnerId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RunStore — Saved Run Persistence
// ---------------------------------------------------------------------------

/// One row of an owner's run listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunListing {
    pub run_id: RunId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A saved run exactly as it was persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRun {
    pub run_id: RunId,
    pub owner: OwnerId,
    pub name: String,
    /// Serialized record set. The store never inspects it.
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

impl StoredRun {
    pub fn listing(&self) -> RunListing {
        RunListing {
            run_id: self.run_id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
        }
    }
}

/// Saved-run store.
///
/// Guarantees:
/// - `save` always creates a new entry; duplicate names are kept apart.
/// - `load` returns the payload byte-for-byte as saved.
/// - `list` is ordered newest first.
/// - `load` and `delete` fail with `StorageError::RunNotFound` on unknown ids.
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Persist a run for `owner` and return its new id.
    async fn save(&self, owner: &OwnerId, name: &str, payload: String) -> StorageResult<RunId>;

    /// List an owner's runs, newest first.
    async fn list(&self, owner: &OwnerId) -> StorageResult<Vec<RunListing>>;

    /// Load a run by id.
    async fn load(&self, run_id: &RunId) -> StorageResult<StoredRun>;

    /// Delete a run by id.
    async fn delete(&self, run_id: &RunId) -> StorageResult<()>;
}

// ---------------------------------------------------------------------------
// OwnerDirectory — Registration and Credentials
// ---------------------------------------------------------------------------

/// SHA-256 hex digest of a password.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Reject blank registrations before they reach a backend.
pub(crate) fn check_registration(email: &str, password: &str) -> StorageResult<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(StorageError::InvalidRegistration {
            reason: "email and password cannot be empty".to_string(),
        });
    }
    Ok(())
}

/// Owner registry.
///
/// Semantics:
/// - emails are unique; a second `register` with the same email fails with
///   `StorageError::DuplicateOwner`.
/// - `authenticate` fails with `StorageError::InvalidCredentials` for an
///   unknown email or a wrong password, without saying which.
#[async_trait]
pub trait OwnerDirectory: Send + Sync {
    async fn register(&self, email: &str, password: &str) -> StorageResult<OwnerId>;

    async fn authenticate(&self, email: &str, password: &str) -> StorageResult<OwnerId>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_password_is_sha256_hex() {
        let digest = hash_password("hunter2");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, hash_password("hunter2"));
        assert_ne!(digest, hash_password("hunter3"));
    }

    #[test]
    fn blank_registration_rejected() {
        assert!(check_registration("", "pw").is_err());
        assert!(check_registration("a@b.c", "").is_err());
        assert!(check_registration("a@b.c", "pw").is_ok());
    }
}
