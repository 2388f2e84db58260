//! Multi-file ingest: normalize every file of a batch, then concatenate.

use crate::domain::error::{Result, RlvisError, ValidationError};
use crate::domain::record::TelemetryRecord;
use crate::ingest::normalize::SchemaNormalizer;
use crate::ingest::table::UploadedFile;
use crate::metrics::METRICS;
use crate::obs;

/// Normalize and merge an upload batch with the default alias table.
pub fn ingest_files(files: &[UploadedFile]) -> Result<Vec<TelemetryRecord>> {
    ingest_with(&SchemaNormalizer::default(), files)
}

/// Normalize and merge an upload batch.
///
/// The batch is all-or-nothing: every file is validated, and if any fails
/// the call returns [`RlvisError::IngestRejected`] carrying one error per
/// failing file, in upload order. On success records are grouped by file in
/// upload order, each file's rows in their original order.
pub fn ingest_with(
    normalizer: &SchemaNormalizer,
    files: &[UploadedFile],
) -> Result<Vec<TelemetryRecord>> {
    if files.is_empty() {
        return Err(ValidationError::EmptyUpload.into());
    }

    let mut accepted = Vec::with_capacity(files.len());
    let mut rejected = Vec::new();

    for file in files {
        match file
            .table()
            .and_then(|table| normalizer.normalize(table, &file.name))
        {
            Ok(records) => accepted.push(records),
            Err(err) => {
                obs::emit_ingest_rejected(&file.name, &err);
                rejected.push(err);
            }
        }
    }

    if !rejected.is_empty() {
        return Err(RlvisError::IngestRejected(rejected));
    }

    for records in &accepted {
        METRICS.add_ingested(records.len());
    }
    let merged = merge_normalized(accepted);
    let reward_rows = merged.iter().filter(|r| r.is_reward_bearing()).count();
    obs::emit_ingest_completed(files.len(), merged.len(), reward_rows);

    Ok(merged)
}

/// Concatenate per-file record sets, preserving file and row order.
pub fn merge_normalized(batches: Vec<Vec<TelemetryRecord>>) -> Vec<TelemetryRecord> {
    let total = batches.iter().map(Vec::len).sum();
    let mut merged = Vec::with_capacity(total);
    for batch in batches {
        merged.extend(batch);
    }
    merged
}
