//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryRunStore` and `MemoryOwnerDirectory` that satisfy the
//! trait contracts without any external dependencies.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StorageError;
use crate::storage_traits::*;

fn lock<T>(mutex: &Mutex<T>) -> StorageResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| StorageError::Backend(format!("lock poisoned: {e}")))
}

// ---------------------------------------------------------------------------
// MemoryRunStore
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Entry {
    /// Insertion order, breaks `created_at` ties in listings
    seq: u64,
    run: StoredRun,
}

#[derive(Debug, Default)]
struct RunTable {
    next_seq: u64,
    entries: HashMap<String, Entry>,
}

/// In-memory run store backed by a `HashMap<RunId, StoredRun>`.
#[derive(Debug, Default)]
pub struct MemoryRunStore {
    runs: Mutex<RunTable>,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of runs currently held, across all owners.
    pub fn len(&self) -> usize {
        self.runs.lock().map(|t| t.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RunStore for MemoryRunStore {
    async fn save(&self, owner: &OwnerId, name: &str, payload: String) -> StorageResult<RunId> {
        let run_id = RunId::new();
        let run = StoredRun {
            run_id: run_id.clone(),
            owner: owner.clone(),
            name: name.to_string(),
            payload,
            created_at: Utc::now(),
        };
        let mut table = lock(&self.runs)?;
        let seq = table.next_seq;
        table.next_seq += 1;
        table.entries.insert(run_id.0.clone(), Entry { seq, run });
        Ok(run_id)
    }

    async fn list(&self, owner: &OwnerId) -> StorageResult<Vec<RunListing>> {
        let table = lock(&self.runs)?;
        let mut owned: Vec<&Entry> = table
            .entries
            .values()
            .filter(|e| e.run.owner == *owner)
            .collect();
        owned.sort_by(|a, b| {
            b.run
                .created_at
                .cmp(&a.run.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(owned.into_iter().map(|e| e.run.listing()).collect())
    }

    async fn load(&self, run_id: &RunId) -> StorageResult<StoredRun> {
        let table = lock(&self.runs)?;
        table
            .entries
            .get(&run_id.0)
            .map(|e| e.run.clone())
            .ok_or_else(|| StorageError::RunNotFound {
                run_id: run_id.0.clone(),
            })
    }

    async fn delete(&self, run_id: &RunId) -> StorageResult<()> {
        let mut table = lock(&self.runs)?;
        table
            .entries
            .remove(&run_id.0)
            .map(|_| ())
            .ok_or_else(|| StorageError::RunNotFound {
                run_id: run_id.0.clone(),
            })
    }
}

// ---------------------------------------------------------------------------
// MemoryOwnerDirectory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct OwnerEntry {
    owner_id: OwnerId,
    password_hash: String,
}

/// In-memory owner directory backed by a `HashMap<email, OwnerEntry>`.
#[derive(Debug, Default)]
pub struct MemoryOwnerDirectory {
    owners: Mutex<HashMap<String, OwnerEntry>>,
}

impl MemoryOwnerDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OwnerDirectory for MemoryOwnerDirectory {
    async fn register(&self, email: &str, password: &str) -> StorageResult<OwnerId> {
        check_registration(email, password)?;
        let mut owners = lock(&self.owners)?;
        if owners.contains_key(email) {
            return Err(StorageError::DuplicateOwner {
                email: email.to_string(),
            });
        }
        let owner_id = OwnerId::new();
        owners.insert(
            email.to_string(),
            OwnerEntry {
                owner_id: owner_id.clone(),
                password_hash: hash_password(password),
            },
        );
        Ok(owner_id)
    }

    async fn authenticate(&self, email: &str, password: &str) -> StorageResult<OwnerId> {
        let owners = lock(&self.owners)?;
        match owners.get(email) {
            Some(entry) if entry.password_hash == hash_password(password) => {
                Ok(entry.owner_id.clone())
            }
            _ => Err(StorageError::InvalidCredentials),
        }
    }
}
