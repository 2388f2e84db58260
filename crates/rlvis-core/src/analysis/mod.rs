//! Display-side analysis over a run's records.

pub mod downsample;
pub mod group;
pub mod kpi;

pub use downsample::{downsample, downsample_indices};
pub use group::{LabelGroup, LabelGroups};
pub use kpi::{compute_kpis, FileKpis, KPI_TAIL_WINDOW};
