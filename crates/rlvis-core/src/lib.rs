//! RL-Vis Core Library
//!
//! Telemetry ingest, KPI aggregation, downsampling and chart preparation for
//! reinforcement-learning training logs.

pub mod analysis;
pub mod archive;
pub mod chart;
pub mod dashboard;
pub mod domain;
pub mod ingest;
pub mod metrics;
pub mod obs;
pub mod telemetry;

pub use domain::{
    Result, RlvisError, Run, SampleRate, SavedRun, TelemetryRecord, ValidationError, ViewParams,
    WindowSize, UNTITLED_RUN,
};

pub use analysis::{
    compute_kpis, downsample, downsample_indices, FileKpis, LabelGroup, LabelGroups,
    KPI_TAIL_WINDOW,
};
pub use archive::{decode_records, encode_records, RunArchive};
pub use chart::{
    confidence_chart, reward_chart, trailing_mean, ChartPoint, ChartRenderer, ChartRequest,
    ChartView, RecordingRenderer, SMOOTHED_REWARD,
};
pub use dashboard::{render_view, ActiveRun, Dashboard, DashboardView, Session};
pub use ingest::{
    ingest_files, ingest_with, merge_normalized, normalize, ColumnAlias, RawTable,
    SchemaNormalizer, UploadedFile, CONFIDENCE_ALIASES,
};

pub use rlvis_state::{OwnerId, RunId, RunListing};

pub use metrics::METRICS;
pub use obs::{
    emit_ingest_completed, emit_ingest_rejected, emit_run_deleted, emit_run_loaded,
    emit_run_saved, emit_view_rendered, run_span, RunSpan,
};
pub use telemetry::init_tracing;

/// RL-Vis version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
