//! Run persistence on top of a [`RunStore`] backend.
//!
//! The store only sees an opaque JSON payload; encoding, decoding and name
//! validation live here.

use rlvis_state::{OwnerId, RunId, RunListing, RunStore};

use crate::domain::error::{Result, ValidationError};
use crate::domain::record::TelemetryRecord;
use crate::domain::run::{Run, SavedRun};
use crate::metrics::METRICS;
use crate::obs;

/// Serialize a record set into a store payload. Absent rewards become `null`.
pub fn encode_records(records: &[TelemetryRecord]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}

pub fn decode_records(payload: &str) -> Result<Vec<TelemetryRecord>> {
    Ok(serde_json::from_str(payload)?)
}

/// Thin API layer over a run store backend.
pub struct RunArchive<S> {
    store: S,
}

impl<S> RunArchive<S>
where
    S: RunStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist `run` under `owner`. Names are not deduplicated.
    pub async fn save(&self, owner: &OwnerId, run: &Run) -> Result<RunId> {
        if run.name.trim().is_empty() {
            return Err(ValidationError::EmptyRunName.into());
        }
        let payload = encode_records(&run.records)?;
        let run_id = self.store.save(owner, &run.name, payload).await?;

        METRICS.inc_runs_saved();
        obs::emit_run_saved(run_id.as_str(), &run.name, run.len());
        Ok(run_id)
    }

    /// The owner's runs, newest first.
    pub async fn list(&self, owner: &OwnerId) -> Result<Vec<RunListing>> {
        Ok(self.store.list(owner).await?)
    }

    pub async fn load(&self, run_id: &RunId) -> Result<SavedRun> {
        let stored = self.store.load(run_id).await?;
        let records = decode_records(&stored.payload)?;
        let run = Run::new(stored.name, records);

        obs::emit_run_loaded(stored.run_id.as_str(), &run.name, run.len());
        Ok(SavedRun {
            run_id: stored.run_id,
            created_at: stored.created_at,
            run,
        })
    }

    pub async fn delete(&self, run_id: &RunId) -> Result<()> {
        self.store.delete(run_id).await?;
        obs::emit_run_deleted(run_id.as_str());
        Ok(())
    }
}
