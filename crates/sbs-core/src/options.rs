//! Stereo conversion options and their validation.
//!
//! Validation never fails: it returns a [`ValidationReport`] the caller
//! is expected to inspect before starting work.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Accepted interpupillary distance in millimeters.
pub const PUPIL_DISTANCE_RANGE_MM: RangeInclusive<f64> = 50.0..=80.0;

/// Accepted convergence distance in millimeters.
pub const CONVERGENCE_DISTANCE_RANGE_MM: RangeInclusive<f64> = 500.0..=5000.0;

pub const PUPIL_DISTANCE_ERROR: &str = "pupil distance out of range";
pub const CONVERGENCE_DISTANCE_ERROR: &str = "convergence distance out of range";

/// Parameters controlling a 2D → SBS conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOptions {
    /// Whether stereo conversion is applied at all.
    pub enabled: bool,
    /// Interpupillary distance (mm).
    pub pupil_distance: f64,
    /// Convergence distance (mm).
    pub convergence_distance: f64,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            pupil_distance: 63.0,
            convergence_distance: 2000.0,
        }
    }
}

impl ConversionOptions {
    pub fn new(pupil_distance: f64, convergence_distance: f64) -> Self {
        Self {
            enabled: true,
            pupil_distance,
            convergence_distance,
        }
    }

    /// Check both ranges independently, collecting every violation.
    pub fn validate(&self) -> ValidationReport {
        validate_options(self)
    }
}

/// Outcome of [`validate_options`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate conversion options. Every out-of-range field contributes its
/// own message; the checks do not short-circuit.
pub fn validate_options(options: &ConversionOptions) -> ValidationReport {
    let mut errors = Vec::new();

    if !PUPIL_DISTANCE_RANGE_MM.contains(&options.pupil_distance) {
        errors.push(PUPIL_DISTANCE_ERROR.to_string());
    }
    if !CONVERGENCE_DISTANCE_RANGE_MM.contains(&options.convergence_distance) {
        errors.push(CONVERGENCE_DISTANCE_ERROR.to_string());
    }

    ValidationReport::from_errors(errors)
}

/// Suggested pupil distance for a screen of the given width.
///
/// `_viewing_distance_mm` is reserved for a field-of-view refinement and
/// does not affect the result yet.
pub fn optimal_pupil_distance(screen_width_mm: f64, _viewing_distance_mm: f64) -> f64 {
    let optimal = screen_width_mm * 30f64.to_radians().tan() / 2.0;
    optimal.clamp(
        *PUPIL_DISTANCE_RANGE_MM.start(),
        *PUPIL_DISTANCE_RANGE_MM.end(),
    )
}
