//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! wants to override.

use crate::error::{Result, StereoError};
use crate::memory_budget;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Per-pixel color adjustment applied before stereo synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorAdjustment {
    /// Multiplier applied to every channel (1.0 = unchanged).
    pub brightness: f32,
    /// Contrast around the 128 midpoint (1.0 = unchanged).
    pub contrast: f32,
    /// Blend factor away from per-pixel gray (1.0 = unchanged, 0.0 = gray).
    pub saturation: f32,
}

impl ColorAdjustment {
    pub const IDENTITY: Self = Self {
        brightness: 1.0,
        contrast: 1.0,
        saturation: 1.0,
    };

    pub fn new(brightness: f32, contrast: f32, saturation: f32) -> Self {
        Self {
            brightness,
            contrast,
            saturation,
        }
    }

    /// Whether applying this adjustment leaves pixels unchanged.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for ColorAdjustment {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Tunables for the conversion engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of frames held by a frame cache.
    pub frame_cache_capacity: usize,
    /// Memory budget the sampling planner keeps buffered frames under.
    pub memory_budget_bytes: u64,
    /// Reference resolution used to estimate per-frame memory.
    pub reference_width: u32,
    pub reference_height: u32,
    /// Frame rate assumed when metadata does not provide one.
    pub default_fps: f64,
    /// Percent advanced per session progress step.
    pub progress_step: u8,
    /// Delay between session progress steps.
    pub progress_step_delay_ms: u64,
    /// Color adjustment applied before synthesis.
    pub color: ColorAdjustment,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_cache_capacity: memory_budget::FRAME_CACHE_CAPACITY,
            memory_budget_bytes: memory_budget::SAMPLING_MEMORY_BUDGET,
            reference_width: memory_budget::REFERENCE_WIDTH,
            reference_height: memory_budget::REFERENCE_HEIGHT,
            default_fps: 30.0,
            progress_step: 10,
            progress_step_delay_ms: 100,
            color: ColorAdjustment::IDENTITY,
        }
    }
}

impl EngineConfig {
    /// Load a config from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| StereoError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        info!(path = %path.display(), "Loaded engine config");
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.frame_cache_capacity == 0 {
            return Err(StereoError::Config(
                "frame_cache_capacity must be at least 1".into(),
            ));
        }
        if self.memory_budget_bytes == 0 {
            return Err(StereoError::Config(
                "memory_budget_bytes must be positive".into(),
            ));
        }
        if self.default_fps.is_nan() || self.default_fps <= 0.0 {
            return Err(StereoError::Config("default_fps must be positive".into()));
        }
        if self.progress_step == 0 || self.progress_step > 100 {
            return Err(StereoError::Config(
                "progress_step must be in 1..=100".into(),
            ));
        }
        Ok(())
    }

    /// Bytes of one RGBA frame at the reference resolution.
    pub fn per_frame_bytes(&self) -> u64 {
        self.reference_width as u64 * self.reference_height as u64 * 4
    }
}
