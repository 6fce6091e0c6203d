//! Memory-budgeted frame sampling.
//!
//! Picks a stride through the frame sequence so that the frames kept in
//! memory stay under a fixed budget. The estimate assumes every frame is an
//! RGBA frame at the reference resolution, regardless of the real video.

use sbs_core::{memory_budget, EngineConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

const MIB: f64 = 1024.0 * 1024.0;

/// Result of [`SamplingPlanner::plan`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingPlan {
    /// Keep every `sampling_rate`-th frame (always ≥ 1).
    pub sampling_rate: u64,
    /// Frames in the source sequence.
    pub total_frames: u64,
    /// Frames kept after sampling.
    pub effective_frames: u64,
    /// Memory the kept frames are expected to occupy.
    pub estimated_memory_mib: f64,
}

impl SamplingPlan {
    /// Indices of the kept frames: `0, rate, 2·rate, …` below `total_frames`.
    pub fn frame_indices(&self) -> impl Iterator<Item = u64> {
        (0..self.total_frames).step_by(self.sampling_rate.max(1) as usize)
    }
}

/// Computes sampling plans against a memory budget.
#[derive(Debug, Clone, Copy)]
pub struct SamplingPlanner {
    per_frame_bytes: u64,
    max_memory_bytes: u64,
}

impl Default for SamplingPlanner {
    fn default() -> Self {
        Self {
            per_frame_bytes: memory_budget::REFERENCE_FRAME_BYTES,
            max_memory_bytes: memory_budget::SAMPLING_MEMORY_BUDGET,
        }
    }
}

impl SamplingPlanner {
    pub fn new(per_frame_bytes: u64, max_memory_bytes: u64) -> Self {
        Self {
            per_frame_bytes,
            max_memory_bytes: max_memory_bytes.max(1),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.per_frame_bytes(), config.memory_budget_bytes)
    }

    pub fn per_frame_bytes(&self) -> u64 {
        self.per_frame_bytes
    }

    /// Plan sampling for a video of the given duration and frame rate.
    ///
    /// `_video_size_bytes` is accepted for a future size-aware estimate and
    /// currently has no effect.
    pub fn plan(&self, _video_size_bytes: u64, duration_secs: f64, fps: f64) -> SamplingPlan {
        let frames = (duration_secs * fps).round();
        let total_frames = if frames.is_finite() && frames > 0.0 {
            frames as u64
        } else {
            0
        };

        let total_memory = total_frames.saturating_mul(self.per_frame_bytes);
        let sampling_rate = total_memory.div_ceil(self.max_memory_bytes).max(1);
        let effective_frames = total_frames.div_ceil(sampling_rate);
        let estimated_memory_mib = total_memory as f64 / sampling_rate as f64 / MIB;

        debug!(
            total_frames,
            sampling_rate, effective_frames, estimated_memory_mib, "Planned frame sampling"
        );

        SamplingPlan {
            sampling_rate,
            total_frames,
            effective_frames,
            estimated_memory_mib,
        }
    }
}
