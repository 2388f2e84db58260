//! Runs: named record sets spanning one or more files.

use chrono::{DateTime, Utc};
use rlvis_state::RunId;
use serde::{Deserialize, Serialize};

use super::record::TelemetryRecord;

/// Display name used before any run is uploaded or opened.
pub const UNTITLED_RUN: &str = "New Run";

/// An ordered collection of records with a display name.
///
/// Records are grouped by `file_label` in upload order. Timestep order is
/// not guaranteed and is restored by the analysis stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub name: String,
    pub records: Vec<TelemetryRecord>,
}

impl Run {
    pub fn new(name: impl Into<String>, records: Vec<TelemetryRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct file labels in first-appearance order.
    pub fn file_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for record in &self.records {
            if !labels.contains(&record.file_label.as_str()) {
                labels.push(&record.file_label);
            }
        }
        labels
    }

    /// Number of reward-bearing rows across all files.
    pub fn reward_rows(&self) -> usize {
        self.records.iter().filter(|r| r.is_reward_bearing()).count()
    }
}

/// A run as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedRun {
    pub run_id: RunId,
    pub created_at: DateTime<Utc>,
    pub run: Run,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_labels_keep_upload_order() {
        let run = Run::new(
            "mixed",
            vec![
                TelemetryRecord::new(0, None, 0.1, "b.csv"),
                TelemetryRecord::new(1, Some(1.0), 0.2, "b.csv"),
                TelemetryRecord::new(0, None, 0.3, "a.csv"),
            ],
        );
        assert_eq!(run.file_labels(), vec!["b.csv", "a.csv"]);
        assert_eq!(run.reward_rows(), 1);
        assert_eq!(run.len(), 3);
    }
}
