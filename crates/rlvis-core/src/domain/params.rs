//! View parameters chosen by the user at display time.
//!
//! None of these mutate a saved run; they only shape the current view.

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Stride for confidence-only rows. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRate(usize);

impl SampleRate {
    /// Keep every row.
    pub const FULL: SampleRate = SampleRate(1);

    pub fn new(rate: usize) -> Result<Self, ValidationError> {
        if rate == 0 {
            return Err(ValidationError::OutOfRange {
                parameter: "sample_rate",
                value: rate,
                min: 1,
                max: usize::MAX,
            });
        }
        Ok(Self(rate))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

/// Trailing window for reward smoothing. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize(usize);

impl WindowSize {
    pub fn new(size: usize) -> Result<Self, ValidationError> {
        if size == 0 {
            return Err(ValidationError::OutOfRange {
                parameter: "window_size",
                value: size,
                min: 1,
                max: usize::MAX,
            });
        }
        Ok(Self(size))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

/// Bounds the dashboard accepts for each control.
pub const SAMPLE_RATE_RANGE: (usize, usize) = (1, 5000);
pub const WINDOW_SIZE_RANGE: (usize, usize) = (10, 200);
pub const DEFAULT_SAMPLE_RATE: usize = 100;
pub const DEFAULT_WINDOW_SIZE: usize = 50;

/// Per-view controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewParams {
    pub sample_rate: SampleRate,
    pub smooth_rewards: bool,
    pub window_size: WindowSize,
}

impl ViewParams {
    /// Build view parameters, enforcing the dashboard ranges.
    pub fn new(
        sample_rate: usize,
        smooth_rewards: bool,
        window_size: usize,
    ) -> Result<Self, ValidationError> {
        check_range("sample_rate", sample_rate, SAMPLE_RATE_RANGE)?;
        check_range("window_size", window_size, WINDOW_SIZE_RANGE)?;
        Ok(Self {
            sample_rate: SampleRate::new(sample_rate)?,
            smooth_rewards,
            window_size: WindowSize::new(window_size)?,
        })
    }

    /// Smoothing window, if smoothing is switched on.
    pub fn smoothing(&self) -> Option<WindowSize> {
        self.smooth_rewards.then_some(self.window_size)
    }
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            sample_rate: SampleRate(DEFAULT_SAMPLE_RATE),
            smooth_rewards: false,
            window_size: WindowSize(DEFAULT_WINDOW_SIZE),
        }
    }
}

fn check_range(
    parameter: &'static str,
    value: usize,
    (min, max): (usize, usize),
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            parameter,
            value,
            min,
            max,
        });
    }
    Ok(())
}
