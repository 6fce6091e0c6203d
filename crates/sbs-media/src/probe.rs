//! Video metadata supplied by a container inspector.

use serde::{Deserialize, Serialize};

/// Information about a source video, as reported by whatever inspected
/// the file. The engine never parses containers itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// File size in bytes.
    pub size_bytes: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Frames per second.
    pub fps: f64,
    /// Native frame dimensions.
    pub width: u32,
    pub height: u32,
}

impl VideoMetadata {
    /// Total frame count, rounded to the nearest frame.
    pub fn frame_count(&self) -> u64 {
        let frames = (self.duration_secs * self.fps).round();
        if frames.is_finite() && frames > 0.0 {
            frames as u64
        } else {
            0
        }
    }

    /// Timestamp of a frame index in milliseconds.
    pub fn timestamp_ms(&self, index: u64) -> f64 {
        if self.fps > 0.0 {
            index as f64 * 1000.0 / self.fps
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(duration_secs: f64, fps: f64) -> VideoMetadata {
        VideoMetadata {
            size_bytes: 0,
            duration_secs,
            fps,
            width: 1920,
            height: 1080,
        }
    }

    #[test]
    fn test_frame_count_rounds() {
        assert_eq!(meta(60.0, 30.0).frame_count(), 1800);
        assert_eq!(meta(1.02, 29.97).frame_count(), 31);
    }

    #[test]
    fn test_frame_count_degenerate() {
        assert_eq!(meta(0.0, 30.0).frame_count(), 0);
        assert_eq!(meta(-5.0, 30.0).frame_count(), 0);
        assert_eq!(meta(f64::NAN, 30.0).frame_count(), 0);
    }

    #[test]
    fn test_timestamp() {
        assert_eq!(meta(10.0, 25.0).timestamp_ms(50), 2000.0);
        assert_eq!(meta(10.0, 0.0).timestamp_ms(50), 0.0);
    }
}
