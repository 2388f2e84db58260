//! Row definitions for the RL-Vis SurrealDB tables
//!
//! Tables:
//! - runs: saved runs, one row per save (payload is an opaque JSON string)
//! - owners: registered owners and their password digests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage_traits::{OwnerId, RunId, RunListing, StoredRun};

/// Module for serializing chrono DateTime to SurrealDB datetime format
mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

/// Saved run row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRow {
    /// SurrealDB record ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<surrealdb::sql::Thing>,
    /// Unique run ID (UUID string)
    pub run_id: String,
    /// Owning identity
    pub owner_id: String,
    /// Display name, not unique
    pub run_name: String,
    /// Serialized record set, stored verbatim
    pub data_json: String,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
}

impl RunRow {
    /// Create a new row stamped with the current time
    pub fn new(run_id: &RunId, owner: &OwnerId, run_name: &str, data_json: String) -> Self {
        RunRow {
            id: None,
            run_id: run_id.0.clone(),
            owner_id: owner.0.clone(),
            run_name: run_name.to_string(),
            data_json,
            created_at: Utc::now(),
        }
    }

    pub fn into_stored(self) -> StoredRun {
        StoredRun {
            run_id: RunId(self.run_id),
            owner: OwnerId(self.owner_id),
            name: self.run_name,
            payload: self.data_json,
            created_at: self.created_at,
        }
    }
}

/// Projection used by owner listings (skips the payload)
#[derive(Debug, Clone, Deserialize)]
pub struct RunListingRow {
    pub run_id: String,
    pub run_name: String,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
}

impl From<RunListingRow> for RunListing {
    fn from(row: RunListingRow) -> Self {
        RunListing {
            run_id: RunId(row.run_id),
            name: row.run_name,
            created_at: row.created_at,
        }
    }
}

/// Registered owner row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<surrealdb::sql::Thing>,
    pub owner_id: String,
    /// Unique login email
    pub email: String,
    /// SHA-256 hex digest of the password
    pub password_hash: String,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
}

impl OwnerRow {
    pub fn new(owner_id: &OwnerId, email: &str, password_hash: String) -> Self {
        OwnerRow {
            id: None,
            owner_id: owner_id.0.clone(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now(),
        }
    }
}
