//! Reward-preserving downsampling for display.
//!
//! Confidence rows arrive every step and dominate the row count; reward rows
//! only appear at episode boundaries. Strided sampling thins the former and
//! never touches the latter, so sparse rewards survive any sample rate.

use crate::analysis::group::LabelGroups;
use crate::domain::params::SampleRate;
use crate::domain::record::TelemetryRecord;
use crate::metrics::METRICS;

/// Indices into `records` that survive downsampling, in output order.
///
/// Per file: every reward-bearing row, plus confidence-only rows 0, r, 2r, …
/// counted in the file's original row order. Output is sorted by timestep,
/// ties by original index.
pub fn downsample_indices(records: &[TelemetryRecord], rate: SampleRate) -> Vec<usize> {
    let stride = rate.get();
    LabelGroups::partition(records).reassemble(|group| {
        let mut kept = Vec::new();
        let mut confidence_seen = 0usize;
        for (i, record) in group.rows() {
            if record.is_reward_bearing() {
                kept.push((i, i));
                continue;
            }
            if confidence_seen % stride == 0 {
                kept.push((i, i));
            }
            confidence_seen += 1;
        }
        kept
    })
}

/// Downsampled copy of `records`; the input is left untouched.
pub fn downsample(records: &[TelemetryRecord], rate: SampleRate) -> Vec<TelemetryRecord> {
    let sampled: Vec<TelemetryRecord> = downsample_indices(records, rate)
        .into_iter()
        .map(|i| records[i].clone())
        .collect();
    METRICS.add_points_downsampled(records.len() - sampled.len());
    sampled
}
