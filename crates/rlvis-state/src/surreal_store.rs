//! SurrealDB-backed RunStore and OwnerDirectory implementation
//!
//! Uses `schema::RunRow` and `schema::OwnerRow` for persistence,
//! converting to/from `storage_traits` types at the boundary.

use async_trait::async_trait;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info, instrument};

use crate::error::StorageError;
use crate::handle::{self, StoreConfig};
use crate::schema::{OwnerRow, RunListingRow, RunRow};
use crate::storage_traits::{
    check_registration, hash_password, OwnerDirectory, OwnerId, RunId, RunListing, RunStore,
    StorageResult, StoredRun,
};

/// SurrealDB-backed implementation of [`RunStore`] and [`OwnerDirectory`].
#[derive(Clone)]
pub struct SurrealRunStore {
    db: Surreal<Any>,
}

impl SurrealRunStore {
    /// Create an in-memory instance for testing.
    ///
    /// Connects to `mem://`, selects `rlvis/main`, and runs `init_schema`.
    pub async fn in_memory() -> crate::Result<Self> {
        Self::connect(&StoreConfig::memory()).await
    }

    /// Create from environment variables (see [`StoreConfig::from_env`]).
    pub async fn from_env() -> crate::Result<Self> {
        let config = StoreConfig::from_env()?;
        Self::connect(&config).await
    }

    pub async fn connect(config: &StoreConfig) -> crate::Result<Self> {
        let db = handle::connect(config).await?;
        info!(store = ?config.target, "SurrealRunStore connected");
        Ok(Self { db })
    }

    // -- private helpers -----------------------------------------------------

    /// Fetch a run row by ID, returning the DB row or RunNotFound.
    async fn fetch_run(&self, rid: &str) -> StorageResult<RunRow> {
        let mut res = self
            .db
            .query("SELECT * FROM runs WHERE run_id = $rid")
            .bind(("rid", rid.to_string()))
            .await?;

        let rows: Vec<RunRow> = res.take(0)?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StorageError::RunNotFound {
                run_id: rid.to_string(),
            })
    }

    async fn fetch_owner(&self, email: &str) -> StorageResult<Option<OwnerRow>> {
        let mut res = self
            .db
            .query("SELECT * FROM owners WHERE email = $email")
            .bind(("email", email.to_string()))
            .await?;

        let rows: Vec<OwnerRow> = res.take(0)?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl RunStore for SurrealRunStore {
    #[instrument(skip(self, payload), fields(owner = %owner, bytes = payload.len()))]
    async fn save(&self, owner: &OwnerId, name: &str, payload: String) -> StorageResult<RunId> {
        let run_id = RunId::new();
        let row = RunRow::new(&run_id, owner, name, payload);

        debug!(run_id = %run_id, "creating run");

        let created: Option<RunRow> = self.db.create("runs").content(row).await?;
        created.ok_or_else(|| StorageError::Backend("create returned no row".to_string()))?;

        Ok(run_id)
    }

    #[instrument(skip(self), fields(owner = %owner))]
    async fn list(&self, owner: &OwnerId) -> StorageResult<Vec<RunListing>> {
        let mut res = self
            .db
            .query(
                "SELECT run_id, run_name, created_at FROM runs \
                 WHERE owner_id = $owner ORDER BY created_at DESC",
            )
            .bind(("owner", owner.0.clone()))
            .await?;

        let rows: Vec<RunListingRow> = res.take(0)?;
        Ok(rows.into_iter().map(RunListing::from).collect())
    }

    #[instrument(skip(self), fields(run_id = %run_id))]
    async fn load(&self, run_id: &RunId) -> StorageResult<StoredRun> {
        let row = self.fetch_run(&run_id.0).await?;
        Ok(row.into_stored())
    }

    #[instrument(skip(self), fields(run_id = %run_id))]
    async fn delete(&self, run_id: &RunId) -> StorageResult<()> {
        // Existence check first so a missing id surfaces as RunNotFound
        self.fetch_run(&run_id.0).await?;

        self.db
            .query("DELETE runs WHERE run_id = $rid")
            .bind(("rid", run_id.0.clone()))
            .await?
            .check()?;

        debug!("run deleted");
        Ok(())
    }
}

#[async_trait]
impl OwnerDirectory for SurrealRunStore {
    #[instrument(skip(self, password))]
    async fn register(&self, email: &str, password: &str) -> StorageResult<OwnerId> {
        check_registration(email, password)?;

        if self.fetch_owner(email).await?.is_some() {
            return Err(StorageError::DuplicateOwner {
                email: email.to_string(),
            });
        }

        let owner_id = OwnerId::new();
        let row = OwnerRow::new(&owner_id, email, hash_password(password));

        // The unique email index is the backstop for a concurrent registration
        let created: Option<OwnerRow> = self
            .db
            .create("owners")
            .content(row)
            .await
            .map_err(|e| {
                let msg = e.to_string();
                if msg.contains("already contains") {
                    StorageError::DuplicateOwner {
                        email: email.to_string(),
                    }
                } else {
                    StorageError::Backend(msg)
                }
            })?;
        created.ok_or_else(|| StorageError::Backend("create returned no row".to_string()))?;

        info!(owner = %owner_id, "owner registered");
        Ok(owner_id)
    }

    #[instrument(skip(self, password))]
    async fn authenticate(&self, email: &str, password: &str) -> StorageResult<OwnerId> {
        match self.fetch_owner(email).await? {
            Some(row) if row.password_hash == hash_password(password) => {
                Ok(OwnerId(row.owner_id))
            }
            _ => Err(StorageError::InvalidCredentials),
        }
    }
}
