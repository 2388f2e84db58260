//! Chart data building and the render boundary.
//!
//! The builders never mutate the records they are given; a view is derived
//! fresh from the (downsampled) run on every render.

use serde::{Deserialize, Serialize};

use crate::analysis::group::LabelGroups;
use crate::domain::error::Result;
use crate::domain::params::WindowSize;
use crate::domain::record::{
    TelemetryRecord, CONFIDENCE_METRIC, CUMULATIVE_REWARD, FILE_LABEL, TIMESTEP,
};

/// Plotted field when reward smoothing is on.
pub const SMOOTHED_REWARD: &str = "smoothed_reward";

/// One plotted point. `value` is whatever `ChartRequest::y_field` names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub timestep: u64,
    pub value: f64,
    pub file_label: String,
}

/// A line chart, one series per `group_field` value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub title: String,
    pub x_field: String,
    pub y_field: String,
    pub x_title: String,
    pub y_title: String,
    pub group_field: String,
    pub tooltip: Vec<String>,
    pub points: Vec<ChartPoint>,
}

impl ChartRequest {
    fn line(title: &str, y_field: &str, y_title: &str, points: Vec<ChartPoint>) -> Self {
        Self {
            title: title.to_string(),
            x_field: TIMESTEP.to_string(),
            y_field: y_field.to_string(),
            x_title: "Timestep".to_string(),
            y_title: y_title.to_string(),
            group_field: FILE_LABEL.to_string(),
            tooltip: vec![
                TIMESTEP.to_string(),
                y_field.to_string(),
                FILE_LABEL.to_string(),
            ],
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Which of the two dashboard charts to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartView {
    Reward,
    Confidence,
}

impl ChartView {
    pub fn build(self, sampled: &[TelemetryRecord], smoothing: Option<WindowSize>) -> ChartRequest {
        match self {
            ChartView::Reward => reward_chart(sampled, smoothing),
            ChartView::Confidence => confidence_chart(sampled),
        }
    }
}

/// External chart sink.
pub trait ChartRenderer {
    fn render(&mut self, request: &ChartRequest) -> Result<()>;
}

/// Collects requests in memory.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub requests: Vec<ChartRequest>,
}

impl ChartRenderer for RecordingRenderer {
    fn render(&mut self, request: &ChartRequest) -> Result<()> {
        self.requests.push(request.clone());
        Ok(())
    }
}

/// Reward chart over reward-bearing rows only.
///
/// With `smoothing`, each file's rewards are replaced in timestep order by
/// the trailing mean of up to the last `w` rewards.
pub fn reward_chart(sampled: &[TelemetryRecord], smoothing: Option<WindowSize>) -> ChartRequest {
    let points = LabelGroups::partition(sampled).reassemble(|group| {
        let rows: Vec<(usize, &TelemetryRecord, f64)> = group
            .rows_by_timestep()
            .into_iter()
            .filter_map(|(i, r)| r.cumulative_reward.map(|reward| (i, r, reward)))
            .collect();

        let values: Vec<f64> = match smoothing {
            Some(window) => {
                let rewards: Vec<f64> = rows.iter().map(|(_, _, v)| *v).collect();
                trailing_mean(&rewards, window)
            }
            None => rows.iter().map(|(_, _, v)| *v).collect(),
        };

        rows.iter()
            .zip(values)
            .map(|((i, r, _), value)| {
                (
                    *i,
                    ChartPoint {
                        timestep: r.timestep,
                        value,
                        file_label: r.file_label.clone(),
                    },
                )
            })
            .collect()
    });

    let y_field = if smoothing.is_some() {
        SMOOTHED_REWARD
    } else {
        CUMULATIVE_REWARD
    };
    ChartRequest::line("Agent Performance (Reward)", y_field, "Reward", points)
}

/// Confidence chart over every sampled row, independent of smoothing.
pub fn confidence_chart(sampled: &[TelemetryRecord]) -> ChartRequest {
    let mut points: Vec<(u64, usize, ChartPoint)> = sampled
        .iter()
        .enumerate()
        .map(|(i, r)| {
            (
                r.timestep,
                i,
                ChartPoint {
                    timestep: r.timestep,
                    value: r.confidence_metric,
                    file_label: r.file_label.clone(),
                },
            )
        })
        .collect();
    points.sort_by_key(|(ts, i, _)| (*ts, *i));

    ChartRequest::line(
        "Agent Confidence (confidence_metric)",
        CONFIDENCE_METRIC,
        "Confidence",
        points.into_iter().map(|(_, _, p)| p).collect(),
    )
}

/// Trailing mean over up to the last `window` values (minimum one value).
///
/// Each window is summed afresh so large values never leak into later means.
pub fn trailing_mean(values: &[f64], window: WindowSize) -> Vec<f64> {
    let w = window.get();
    (0..values.len())
        .map(|i| {
            let span = &values[(i + 1).saturating_sub(w)..=i];
            span.iter().sum::<f64>() / span.len() as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(w: usize) -> WindowSize {
        WindowSize::new(w).unwrap()
    }

    #[test]
    fn trailing_mean_uses_partial_windows() {
        assert_eq!(trailing_mean(&[10.0, 20.0, 30.0], window(2)), [10.0, 15.0, 25.0]);
        assert_eq!(trailing_mean(&[4.0, 8.0], window(50)), [4.0, 6.0]);
        assert!(trailing_mean(&[], window(3)).is_empty());
    }

    #[test]
    fn large_values_do_not_linger_after_leaving_the_window() {
        let means = trailing_mean(&[1e17, 1.0, 1.0, 1.0], window(2));
        assert_eq!(means[2], 1.0);
        assert_eq!(means[3], 1.0);
    }

    #[test]
    fn window_of_one_is_identity() {
        let values = [3.0, -1.0, 7.5];
        assert_eq!(trailing_mean(&values, window(1)), values);
    }

    #[test]
    fn reward_chart_skips_confidence_rows() {
        let records = vec![
            TelemetryRecord::new(1, None, 0.1, "a"),
            TelemetryRecord::new(2, Some(5.0), 0.2, "a"),
            TelemetryRecord::new(3, None, 0.3, "a"),
        ];
        let chart = reward_chart(&records, None);

        assert_eq!(chart.y_field, "cumulative_reward");
        assert_eq!(chart.points.len(), 1);
        assert_eq!(chart.points[0].value, 5.0);
        assert_eq!(chart.tooltip, ["timestep", "cumulative_reward", "file_label"]);
    }

    #[test]
    fn smoothing_is_per_file_in_timestep_order() {
        let records = vec![
            TelemetryRecord::new(30, Some(30.0), 0.0, "a"),
            TelemetryRecord::new(10, Some(10.0), 0.0, "a"),
            TelemetryRecord::new(15, Some(100.0), 0.0, "b"),
            TelemetryRecord::new(20, Some(20.0), 0.0, "a"),
        ];
        let chart = reward_chart(&records, Some(window(2)));

        assert_eq!(chart.y_field, SMOOTHED_REWARD);
        let a: Vec<(u64, f64)> = chart
            .points
            .iter()
            .filter(|p| p.file_label == "a")
            .map(|p| (p.timestep, p.value))
            .collect();
        assert_eq!(a, [(10, 10.0), (20, 15.0), (30, 25.0)]);

        // b is unaffected by a's values
        let b = chart.points.iter().find(|p| p.file_label == "b").map(|p| p.value);
        assert_eq!(b, Some(100.0));

        let steps: Vec<u64> = chart.points.iter().map(|p| p.timestep).collect();
        assert_eq!(steps, [10, 15, 20, 30]);
    }

    #[test]
    fn smoothing_leaves_records_untouched() {
        let records = vec![
            TelemetryRecord::new(1, Some(1.0), 0.0, "a"),
            TelemetryRecord::new(2, Some(3.0), 0.0, "a"),
        ];
        let before = records.clone();
        let _ = reward_chart(&records, Some(window(2)));
        assert_eq!(records, before);
    }

    #[test]
    fn confidence_chart_plots_every_row() {
        let records = vec![
            TelemetryRecord::new(2, None, 0.2, "a"),
            TelemetryRecord::new(1, Some(9.0), 0.1, "b"),
        ];
        let chart = ChartView::Confidence.build(&records, Some(window(10)));

        assert_eq!(chart.y_field, "confidence_metric");
        assert_eq!(chart.group_field, "file_label");
        let values: Vec<f64> = chart.points.iter().map(|p| p.value).collect();
        assert_eq!(values, [0.1, 0.2]);
    }

    #[test]
    fn recording_renderer_keeps_requests() {
        let mut renderer = RecordingRenderer::default();
        let chart = confidence_chart(&[]);
        renderer.render(&chart).unwrap();
        assert_eq!(renderer.requests.len(), 1);
        assert!(renderer.requests[0].is_empty());
    }
}
