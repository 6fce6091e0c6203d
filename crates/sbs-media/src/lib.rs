//! SBS Media - frame extraction, caching, and conversion orchestration
//!
//! This crate handles:
//! - The frame-source collaborator boundary
//! - Memory-budgeted frame sampling
//! - The bounded frame cache and batch conversion controller
//! - Whole-video conversion sessions and their result cache

pub mod batch;
pub mod cache;
pub mod cancel;
pub mod probe;
pub mod result_cache;
pub mod sampling;
pub mod session;
pub mod source;

pub use batch::{BatchController, BatchReport, BufferStats, FrameProcessorState};
pub use cache::{FrameCache, FrameKey, SharedFrameCache};
pub use cancel::CancelToken;
pub use probe::VideoMetadata;
pub use result_cache::{ConversionResult, ResultCache, ResultKey};
pub use sampling::{SamplingPlan, SamplingPlanner};
pub use session::{ConversionSession, SessionConfig, SessionState};
pub use source::{FrameRequest, FrameSource, TestPatternSource};
