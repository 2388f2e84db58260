//! Global atomic counters for RL-Vis.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. before the CLI exits).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    files_ingested: AtomicU64,
    rows_ingested: AtomicU64,
    runs_saved: AtomicU64,
    points_downsampled: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            files_ingested: AtomicU64::new(0),
            rows_ingested: AtomicU64::new(0),
            runs_saved: AtomicU64::new(0),
            points_downsampled: AtomicU64::new(0),
        }
    }

    /// Record one accepted file and its row count.
    pub fn add_ingested(&self, rows: usize) {
        self.files_ingested.fetch_add(1, Ordering::Relaxed);
        self.rows_ingested.fetch_add(rows as u64, Ordering::Relaxed);
        tracing::trace!(metric = "files_ingested", "counter incremented");
    }

    pub fn inc_runs_saved(&self) {
        self.runs_saved.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "runs_saved", "counter incremented");
    }

    /// Record how many rows a downsampling pass dropped.
    pub fn add_points_downsampled(&self, dropped: usize) {
        self.points_downsampled
            .fetch_add(dropped as u64, Ordering::Relaxed);
        tracing::trace!(metric = "points_downsampled", dropped, "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            files_ingested = self.files_ingested(),
            rows_ingested = self.rows_ingested(),
            runs_saved = self.runs_saved(),
            points_downsampled = self.points_downsampled(),
        );
    }

    pub fn files_ingested(&self) -> u64 {
        self.files_ingested.load(Ordering::Relaxed)
    }

    pub fn rows_ingested(&self) -> u64 {
        self.rows_ingested.load(Ordering::Relaxed)
    }

    pub fn runs_saved(&self) -> u64 {
        self.runs_saved.load(Ordering::Relaxed)
    }

    pub fn points_downsampled(&self) -> u64 {
        self.points_downsampled.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.files_ingested.store(0, Ordering::Relaxed);
        self.rows_ingested.store(0, Ordering::Relaxed);
        self.runs_saved.store(0, Ordering::Relaxed);
        self.points_downsampled.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        m.add_ingested(120);
        m.add_ingested(30);
        assert_eq!(m.files_ingested(), 2);
        assert_eq!(m.rows_ingested(), 150);

        m.inc_runs_saved();
        assert_eq!(m.runs_saved(), 1);

        m.add_points_downsampled(99);
        assert_eq!(m.points_downsampled(), 99);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.add_ingested(5);
        m.inc_runs_saved();
        m.add_points_downsampled(3);
        m.reset();
        assert_eq!(m.files_ingested(), 0);
        assert_eq!(m.rows_ingested(), 0);
        assert_eq!(m.runs_saved(), 0);
        assert_eq!(m.points_downsampled(), 0);
    }
}
