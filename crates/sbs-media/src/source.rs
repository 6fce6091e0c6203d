//! Frame-source collaborator boundary.
//!
//! Decoding compressed video happens outside this crate. Anything that can
//! hand back raw frames by index implements [`FrameSource`].

use crate::probe::VideoMetadata;
use sbs_core::{Frame, FrameId, PixelFormat, Result, StereoError, VideoRef};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::trace;

/// Requested output geometry and pixel format for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl FrameRequest {
    pub fn rgba(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Rgba8,
        }
    }
}

/// Supplies decoded frames by index.
///
/// Calls may be slow and may fail with a transport-style error; callers
/// treat each call as a suspension point.
pub trait FrameSource: Send + Sync {
    fn get_frame(
        &self,
        video: &VideoRef,
        index: FrameId,
        request: FrameRequest,
    ) -> impl Future<Output = Result<Frame>> + Send;
}

/// Synthetic source producing color-bar frames.
///
/// Used by the CLI when no decoder is attached and by tests. It can be told
/// to fail at a specific index and counts how often it was asked for a frame.
pub struct TestPatternSource {
    metadata: VideoMetadata,
    fail_at: Option<u64>,
    delay: Duration,
    calls: AtomicUsize,
}

impl TestPatternSource {
    pub fn new(metadata: VideoMetadata) -> Self {
        Self {
            metadata,
            fail_at: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Make extraction of `index` fail.
    pub fn failing_at(mut self, index: u64) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Simulate decode latency.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Number of `get_frame` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl FrameSource for TestPatternSource {
    async fn get_frame(
        &self,
        video: &VideoRef,
        index: FrameId,
        request: FrameRequest,
    ) -> Result<Frame> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let frame_count = self.metadata.frame_count();
        if index.0 >= frame_count {
            return Err(StereoError::Extraction {
                index: index.0,
                message: format!("{} has only {} frames", video, frame_count),
            });
        }
        if self.fail_at == Some(index.0) {
            return Err(StereoError::Extraction {
                index: index.0,
                message: "source transport error".into(),
            });
        }

        trace!(video = %video, frame = index.0, "Serving test pattern");
        let timestamp_ms = self.metadata.timestamp_ms(index.0);
        match request.format {
            PixelFormat::Rgba8 => Ok(Frame::test_pattern(
                request.width,
                request.height,
                timestamp_ms,
            )),
            PixelFormat::Yuv420P => {
                let size = PixelFormat::Yuv420P.frame_size(request.width, request.height);
                Frame::new(
                    vec![128u8; size],
                    request.width,
                    request.height,
                    PixelFormat::Yuv420P,
                    timestamp_ms,
                )
            }
        }
    }
}
