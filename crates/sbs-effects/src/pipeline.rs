//! Per-frame processing chain: color adjustment, then stereo synthesis.

use crate::color_adjust::ColorAdjustStage;
use crate::disparity::DisparityShift;
use crate::synthesizer::StereoSynthesizer;
use crate::FrameEffect;
use sbs_core::{ColorAdjustment, ConversionOptions, Frame, Result};
use tracing::debug;

/// Ordered chain of frame effects built from conversion options.
pub struct StereoPipeline {
    stages: Vec<Box<dyn FrameEffect>>,
    shift: DisparityShift,
}

impl StereoPipeline {
    /// Build the chain for the given options.
    ///
    /// Identity color adjustments are skipped. When `options.enabled` is
    /// false, no synthesis stage is added and frames pass through.
    pub fn new(options: &ConversionOptions, color: ColorAdjustment) -> Self {
        let shift = DisparityShift::from_options(options);
        let mut stages: Vec<Box<dyn FrameEffect>> = Vec::new();

        if !color.is_identity() {
            stages.push(Box::new(ColorAdjustStage::new(color)));
        }
        if options.enabled {
            stages.push(Box::new(StereoSynthesizer::new(shift)));
        }

        debug!(
            shift = shift.percent(),
            stages = stages.len(),
            "Built stereo pipeline"
        );
        Self { stages, shift }
    }

    /// A pipeline that returns frames unchanged.
    pub fn passthrough() -> Self {
        Self {
            stages: Vec::new(),
            shift: DisparityShift::ZERO,
        }
    }

    pub fn shift(&self) -> DisparityShift {
        self.shift
    }

    /// Names of the stages, in application order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run one frame through every stage.
    pub fn process(&self, frame: &Frame) -> Result<Frame> {
        let Some((first, rest)) = self.stages.split_first() else {
            return Ok(frame.clone());
        };
        let mut current = first.apply(frame)?;
        for stage in rest {
            current = stage.apply(&current)?;
        }
        Ok(current)
    }
}

impl Default for StereoPipeline {
    fn default() -> Self {
        Self::new(&ConversionOptions::default(), ColorAdjustment::IDENTITY)
    }
}
