//! Structured observability hooks for RL-Vis ingest and run lifecycle events.
//!
//! Events are emitted at `info!` level; rejections use `warn!`. Filtering
//! follows `RUST_LOG`; pass `--json` to the CLI for newline-delimited JSON.

use tracing::info;

/// RAII guard that enters a run-scoped tracing span.
///
/// # Example
///
/// ```ignore
/// let _span = RunSpan::enter("6f1c...");
/// // every event below is tagged with run_id = "6f1c..."
/// ```
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(run_id: &str) -> Self {
        Self {
            _span: run_span(run_id).entered(),
        }
    }
}

/// The run-scoped span, for attaching to futures with `Instrument`.
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("rlvis.run", run_id = %run_id)
}

/// Emit event: an upload batch was normalized and merged.
pub fn emit_ingest_completed(files: usize, rows: usize, reward_rows: usize) {
    info!(
        event = "ingest.completed",
        files = files,
        rows = rows,
        reward_rows = reward_rows,
    );
}

/// Emit event: one file of a batch failed validation (warning level).
pub fn emit_ingest_rejected(file: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "ingest.rejected", file = %file, error = %error);
}

pub fn emit_run_saved(run_id: &str, run_name: &str, rows: usize) {
    info!(event = "run.saved", run_id = %run_id, run_name = %run_name, rows = rows);
}

pub fn emit_run_loaded(run_id: &str, run_name: &str, rows: usize) {
    info!(event = "run.loaded", run_id = %run_id, run_name = %run_name, rows = rows);
}

pub fn emit_run_deleted(run_id: &str) {
    info!(event = "run.deleted", run_id = %run_id);
}

/// Emit event: a dashboard view was rendered from `total` records.
pub fn emit_view_rendered(run_name: &str, displayed: usize, total: usize, smoothed: bool) {
    info!(
        event = "view.rendered",
        run_name = %run_name,
        displayed = displayed,
        total = total,
        smoothed = smoothed,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_span_enters() {
        let _span = RunSpan::enter("test-run-id");
    }
}
