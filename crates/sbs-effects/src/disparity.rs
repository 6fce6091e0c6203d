//! Disparity (parallax shift) derived from viewing geometry.

use sbs_core::ConversionOptions;
use serde::{Deserialize, Serialize};

/// Largest horizontal shift, as a percentage of frame width, in either direction.
pub const MAX_SHIFT_PERCENT: f64 = 10.0;

/// Map pupil and convergence distances to a horizontal shift percentage.
///
/// The result is clamped to `[-10, 10]`.
pub fn compute_shift(pupil_distance: f64, convergence_distance: f64) -> f64 {
    let shift = (pupil_distance / convergence_distance) * 100.0;
    shift.clamp(-MAX_SHIFT_PERCENT, MAX_SHIFT_PERCENT)
}

/// Horizontal right-eye shift as a percentage of frame width.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct DisparityShift(f64);

impl DisparityShift {
    pub const ZERO: Self = Self(0.0);

    /// Wrap a percentage, clamping it into range.
    pub fn new(percent: f64) -> Self {
        Self(percent.clamp(-MAX_SHIFT_PERCENT, MAX_SHIFT_PERCENT))
    }

    pub fn from_options(options: &ConversionOptions) -> Self {
        Self(compute_shift(
            options.pupil_distance,
            options.convergence_distance,
        ))
    }

    pub fn percent(self) -> f64 {
        self.0
    }

    /// Shift in whole pixels for a frame of the given width.
    pub fn pixels(self, width: u32) -> i64 {
        (self.0 / 100.0 * width as f64).round() as i64
    }
}
