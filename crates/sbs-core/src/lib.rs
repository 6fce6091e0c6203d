//! SBS Core - Foundation types for stereo conversion
//!
//! This crate provides the fundamental types used throughout SBS Studio:
//! - Frame buffers, pixel formats and video references
//! - Conversion options and their validation
//! - Engine configuration
//! - Error types

pub mod config;
pub mod error;
pub mod frame;
pub mod options;

pub use config::{ColorAdjustment, EngineConfig};
pub use error::{Result, StereoError};
pub use frame::{Frame, FrameId, PixelFormat, SharedFrame, VideoRef};
pub use options::{optimal_pupil_distance, validate_options, ConversionOptions, ValidationReport};

/// Memory budget constants for frame buffering.
pub mod memory_budget {
    /// Reference resolution used for worst-case frame memory estimates.
    pub const REFERENCE_WIDTH: u32 = 1920;
    pub const REFERENCE_HEIGHT: u32 = 1080;

    /// One RGBA frame at the reference resolution (~8 MB).
    pub const REFERENCE_FRAME_BYTES: u64 = REFERENCE_WIDTH as u64 * REFERENCE_HEIGHT as u64 * 4;

    /// Budget the sampling planner keeps buffered frames under.
    pub const SAMPLING_MEMORY_BUDGET: u64 = 500 * 1024 * 1024; // 500 MB

    /// Number of processed frames a frame cache holds.
    pub const FRAME_CACHE_CAPACITY: usize = 100;
}
