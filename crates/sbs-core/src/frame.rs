//! Frame buffer types for video frames in CPU memory.
//!
//! Frames are immutable once produced; shared ownership goes through
//! [`SharedFrame`] so caches and batches can hand out the same pixels.

use crate::error::{Result, StereoError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Index of a frame within a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameId(pub u64);

/// Opaque reference to a source video (a path, URL, or library key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoRef(String);

impl VideoRef {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VideoRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Pixel format enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// 8-bit RGBA (32 bits per pixel)
    #[default]
    Rgba8,
    /// YUV 4:2:0 planar
    Yuv420P,
}

impl PixelFormat {
    /// Calculate total bytes needed for a frame of this format.
    pub fn frame_size(self, width: u32, height: u32) -> usize {
        let (w, h) = (width as usize, height as usize);
        match self {
            Self::Rgba8 => w * h * 4,
            Self::Yuv420P => {
                // Y + U + V planes (U/V at half resolution, rounded up)
                let uv = w.div_ceil(2) * h.div_ceil(2);
                w * h + uv * 2
            }
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgba8 => f.write_str("rgba"),
            Self::Yuv420P => f.write_str("yuv"),
        }
    }
}

/// A video frame in CPU memory.
///
/// Pixels are tightly packed (no row padding) so row `y` of an RGBA frame
/// starts at `y * width * 4`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    timestamp_ms: f64,
}

impl Frame {
    /// Wrap an existing pixel buffer, checking its length against the format.
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        timestamp_ms: f64,
    ) -> Result<Self> {
        let expected = format.frame_size(width, height);
        if data.len() != expected {
            return Err(StereoError::InvalidParameter(format!(
                "{}x{} {} frame needs {} bytes, got {}",
                width,
                height,
                format,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            format,
            timestamp_ms,
        })
    }

    /// Create a zero-filled RGBA frame.
    pub fn blank(width: u32, height: u32, timestamp_ms: f64) -> Self {
        Self {
            data: vec![0u8; PixelFormat::Rgba8.frame_size(width, height)],
            width,
            height,
            format: PixelFormat::Rgba8,
            timestamp_ms,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Presentation timestamp in milliseconds.
    pub fn timestamp_ms(&self) -> f64 {
        self.timestamp_ms
    }

    /// Raw pixel bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the frame and return its pixel buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Total memory usage of this frame in bytes.
    pub fn memory_size(&self) -> usize {
        self.data.len()
    }

    /// Whether the frame has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Get a row of RGBA pixel data.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * 4;
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Get the RGBA value at `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (x * 4) as usize;
        let row = self.row(y);
        [row[i], row[i + 1], row[i + 2], row[i + 3]]
    }

    /// Create a test pattern frame (color bars).
    pub fn test_pattern(width: u32, height: u32, timestamp_ms: f64) -> Self {
        const COLORS: [[u8; 4]; 8] = [
            [255, 255, 255, 255], // White
            [255, 255, 0, 255],   // Yellow
            [0, 255, 255, 255],   // Cyan
            [0, 255, 0, 255],     // Green
            [255, 0, 255, 255],   // Magenta
            [255, 0, 0, 255],     // Red
            [0, 0, 255, 255],     // Blue
            [0, 0, 0, 255],       // Black
        ];

        let mut frame = Self::blank(width, height, timestamp_ms);
        let stride = width as usize * 4;
        if stride == 0 {
            return frame;
        }
        for row in frame.data.chunks_exact_mut(stride) {
            for x in 0..width {
                let i = (x * 4) as usize;
                let bar = (x * 8 / width) as usize;
                row[i..i + 4].copy_from_slice(&COLORS[bar]);
            }
        }
        frame
    }
}

/// Arc-wrapped frame for shared ownership.
pub type SharedFrame = Arc<Frame>;
