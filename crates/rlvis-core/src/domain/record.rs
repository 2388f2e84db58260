//! Canonical telemetry record.

use serde::{Deserialize, Serialize};

/// Canonical column names.
pub const TIMESTEP: &str = "timestep";
pub const CUMULATIVE_REWARD: &str = "cumulative_reward";
pub const CONFIDENCE_METRIC: &str = "confidence_metric";
pub const FILE_LABEL: &str = "file_label";

/// Columns every source file must provide once aliases are applied.
pub const REQUIRED_COLUMNS: [&str; 3] = [TIMESTEP, CUMULATIVE_REWARD, CONFIDENCE_METRIC];

/// One telemetry observation.
///
/// `confidence_metric` is present on every row. `cumulative_reward` is only
/// present on episode-boundary rows; `None` means "no reward this row", which
/// is distinct from a reward of `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub timestep: u64,
    pub cumulative_reward: Option<f64>,
    pub confidence_metric: f64,
    /// Name of the file the row was read from
    pub file_label: String,
}

impl TelemetryRecord {
    pub fn new(
        timestep: u64,
        cumulative_reward: Option<f64>,
        confidence_metric: f64,
        file_label: impl Into<String>,
    ) -> Self {
        Self {
            timestep,
            cumulative_reward,
            confidence_metric,
            file_label: file_label.into(),
        }
    }

    /// True for episode-boundary rows that carry a reward.
    pub fn is_reward_bearing(&self) -> bool {
        self.cumulative_reward.is_some()
    }
}
