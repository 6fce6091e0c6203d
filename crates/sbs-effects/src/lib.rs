//! SBS Effects - CPU frame processing for stereo conversion
//!
//! Provides the disparity calculator, the color adjustment stage, the
//! side-by-side stereo synthesizer, and the pipeline that chains them.

pub mod color_adjust;
pub mod disparity;
pub mod pipeline;
pub mod synthesizer;

pub use color_adjust::{adjust_rgb, adjust_rgba_in_place, ColorAdjustStage};
pub use disparity::{compute_shift, DisparityShift, MAX_SHIFT_PERCENT};
pub use pipeline::StereoPipeline;
pub use synthesizer::{synthesize_sbs, StereoSynthesizer};

use sbs_core::{Frame, Result};

/// Trait for CPU frame effects.
pub trait FrameEffect: Send + Sync {
    /// Get the effect name.
    fn name(&self) -> &str;

    /// Produce a new frame from `frame`.
    fn apply(&self, frame: &Frame) -> Result<Frame>;
}

impl FrameEffect for ColorAdjustStage {
    fn name(&self) -> &str {
        "Color Adjust"
    }

    fn apply(&self, frame: &Frame) -> Result<Frame> {
        self.adjust(frame)
    }
}

impl FrameEffect for StereoSynthesizer {
    fn name(&self) -> &str {
        "Stereo Pair"
    }

    fn apply(&self, frame: &Frame) -> Result<Frame> {
        self.synthesize(frame)
    }
}
