//! Domain models for RL-Vis.
//!
//! Canonical definitions for the core entities:
//! - `TelemetryRecord`: one normalized observation
//! - `Run`: a named record set spanning one or more files
//! - `ViewParams`: display-time controls (sample rate, smoothing)

pub mod error;
pub mod params;
pub mod record;
pub mod run;

pub use error::{Result, RlvisError, ValidationError};
pub use params::{SampleRate, ViewParams, WindowSize};
pub use record::TelemetryRecord;
pub use run::{Run, SavedRun, UNTITLED_RUN};
