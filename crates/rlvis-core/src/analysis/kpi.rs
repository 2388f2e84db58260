//! Per-file headline KPIs.

use serde::{Deserialize, Serialize};

use crate::analysis::group::{LabelGroup, LabelGroups};
use crate::domain::record::TelemetryRecord;

/// Number of trailing rewards averaged for `avg_reward_last_100`.
pub const KPI_TAIL_WINDOW: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileKpis {
    pub file_label: String,
    /// Largest timestep seen in the file
    pub total_timesteps: u64,
    /// `None` when the file has no reward-bearing rows
    pub max_reward: Option<f64>,
    /// Mean of the last [`KPI_TAIL_WINDOW`] rewards; 0.0 with no rewards
    pub avg_reward_last_100: f64,
    pub reward_rows: usize,
    pub total_rows: usize,
}

/// KPIs for every file in `records`, in label order.
///
/// Always computed from the full record set, never a downsampled view.
pub fn compute_kpis(records: &[TelemetryRecord]) -> Vec<FileKpis> {
    LabelGroups::partition(records).map(file_kpis)
}

fn file_kpis(group: &LabelGroup<'_>) -> FileKpis {
    let total_timesteps = group.rows().map(|(_, r)| r.timestep).max().unwrap_or(0);
    let rewards: Vec<f64> = group.rows().filter_map(|(_, r)| r.cumulative_reward).collect();

    let max_reward = rewards.iter().copied().reduce(f64::max);
    let tail = &rewards[rewards.len().saturating_sub(KPI_TAIL_WINDOW)..];
    let avg_reward_last_100 = if tail.is_empty() {
        0.0
    } else {
        tail.iter().sum::<f64>() / tail.len() as f64
    };

    FileKpis {
        file_label: group.label().to_string(),
        total_timesteps,
        max_reward,
        avg_reward_last_100,
        reward_rows: rewards.len(),
        total_rows: group.len(),
    }
}
