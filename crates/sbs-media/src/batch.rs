//! Batch conversion controller.
//!
//! Extracts a contiguous range of frames in order, runs each through the
//! stereo pipeline, and reports progress after every frame. The cancel
//! token is checked before each frame. A single extraction or synthesis
//! failure stops the batch; frames produced before the stop are returned
//! together with the error.

use crate::cache::{FrameKey, SharedFrameCache};
use crate::cancel::CancelToken;
use crate::source::{FrameRequest, FrameSource};
use parking_lot::Mutex;
use sbs_core::{memory_budget, Frame, FrameId, Result, SharedFrame, StereoError, VideoRef};
use sbs_effects::StereoPipeline;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Snapshot of the controller's most recent batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameProcessorState {
    pub is_processing: bool,
    /// Percent of the current batch completed (0–100).
    pub progress: u8,
    pub processed_frames: usize,
    /// Message of the last failure or cancellation, if any.
    pub error: Option<String>,
}

/// Cache occupancy figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferStats {
    pub cached_frames: usize,
    /// `cached_frames` times the reference per-frame size.
    pub estimated_bytes: u64,
}

impl BufferStats {
    pub fn estimated_mib(&self) -> f64 {
        self.estimated_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Frames produced by [`BatchController::process_batch`].
///
/// When `error` is set the batch stopped early and `frames` holds only what
/// was finished before the stop.
#[derive(Debug)]
pub struct BatchReport {
    pub frames: Vec<Frame>,
    pub requested: usize,
    pub error: Option<StereoError>,
}

impl BatchReport {
    /// Whether every requested frame was produced.
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.frames.len() == self.requested
    }

    pub fn is_cancelled(&self) -> bool {
        self.error.as_ref().is_some_and(StereoError::is_cancellation)
    }

    /// Convert into a `Result`, discarding partial frames on failure.
    pub fn into_result(self) -> Result<Vec<Frame>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.frames),
        }
    }
}

/// Sequential frame extraction and stereo synthesis over a frame range.
pub struct BatchController<S> {
    source: S,
    cache: SharedFrameCache,
    pipeline: StereoPipeline,
    cancel: CancelToken,
    state: Mutex<FrameProcessorState>,
    per_frame_bytes: u64,
}

impl<S: FrameSource> BatchController<S> {
    pub fn new(source: S, cache: SharedFrameCache, pipeline: StereoPipeline) -> Self {
        Self {
            source,
            cache,
            pipeline,
            cancel: CancelToken::new(),
            state: Mutex::new(FrameProcessorState::default()),
            per_frame_bytes: memory_budget::REFERENCE_FRAME_BYTES,
        }
    }

    /// Override the per-frame size used by [`Self::buffer_stats`].
    pub fn with_per_frame_bytes(mut self, bytes: u64) -> Self {
        self.per_frame_bytes = bytes;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn pipeline(&self) -> &StereoPipeline {
        &self.pipeline
    }

    /// Handle that cancels the running batch when signalled.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Request cancellation; observed before the next frame.
    pub fn cancel(&self) {
        info!("Batch cancellation requested");
        self.cancel.cancel();
    }

    pub fn state(&self) -> FrameProcessorState {
        self.state.lock().clone()
    }

    /// Get one source frame, from the cache when possible.
    pub async fn extract_frame(
        &self,
        video: &VideoRef,
        index: FrameId,
        request: FrameRequest,
    ) -> Result<SharedFrame> {
        let key = FrameKey::new(video, index, request);
        if let Some(frame) = self.cache.lock().get(&key) {
            debug!(video = %video, frame = index.0, "Frame cache hit");
            return Ok(frame);
        }

        let frame = match self.source.get_frame(video, index, request).await {
            Ok(frame) => Arc::new(frame),
            Err(e @ StereoError::Extraction { .. }) => return Err(e),
            Err(e) => {
                return Err(StereoError::Extraction {
                    index: index.0,
                    message: e.to_string(),
                })
            }
        };
        self.cache.lock().insert(key, Arc::clone(&frame));
        Ok(frame)
    }

    /// Extract and synthesize frames `[start, end)` in order.
    ///
    /// `on_progress` receives the batch percentage after each frame.
    pub async fn process_batch(
        &self,
        video: &VideoRef,
        start: u64,
        end: u64,
        request: FrameRequest,
        mut on_progress: impl FnMut(u8),
    ) -> BatchReport {
        let total = end.saturating_sub(start);
        self.cancel.reset();
        *self.state.lock() = FrameProcessorState {
            is_processing: true,
            ..FrameProcessorState::default()
        };
        info!(video = %video, start, end, "Starting batch");

        // Ranges may extend past the end of the video.
        let mut frames =
            Vec::with_capacity(total.min(memory_budget::FRAME_CACHE_CAPACITY as u64) as usize);
        let mut error = None;

        for index in start..end {
            if self.cancel.is_cancelled() {
                error = Some(StereoError::Cancelled(format!(
                    "batch cancelled after {} of {} frames",
                    frames.len(),
                    total
                )));
                break;
            }

            let produced = match self.extract_frame(video, FrameId(index), request).await {
                Ok(src) => self
                    .pipeline
                    .process(&src)
                    .map_err(|e| StereoError::Conversion(format!("frame {}: {}", index, e))),
                Err(e) => Err(e),
            };

            match produced {
                Ok(frame) => frames.push(frame),
                Err(e) => {
                    error = Some(e);
                    break;
                }
            }

            let progress = percent(index - start + 1, total);
            {
                let mut state = self.state.lock();
                state.progress = progress;
                state.processed_frames = frames.len();
            }
            on_progress(progress);
        }

        let mut state = self.state.lock();
        state.is_processing = false;
        state.processed_frames = frames.len();
        if total == 0 {
            state.progress = 100;
        }
        match &error {
            Some(e) => {
                warn!(video = %video, processed = frames.len(), error = %e, "Batch stopped early");
                state.error = Some(e.to_string());
            }
            None => info!(video = %video, frames = frames.len(), "Batch complete"),
        }
        drop(state);

        BatchReport {
            frames,
            requested: usize::try_from(total).unwrap_or(usize::MAX),
            error,
        }
    }

    /// Cached-entry count and estimated memory.
    pub fn buffer_stats(&self) -> BufferStats {
        let cached_frames = self.cache.lock().len();
        BufferStats {
            cached_frames,
            estimated_bytes: cached_frames as u64 * self.per_frame_bytes,
        }
    }

    /// Drop every cached frame.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }
}

fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done as f64 / total as f64) * 100.0).round().min(100.0) as u8
}
