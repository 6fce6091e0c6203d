//! Side-by-side stereo pair synthesis.
//!
//! The output frame is twice as wide as the source. Columns `[0, w)` hold
//! the source unchanged (left eye); columns `[w, 2w)` hold the source
//! resampled with a horizontal shift (right eye). Source columns that fall
//! outside the frame clamp to the nearest edge column, which stretches the
//! edge instead of wrapping.

use crate::disparity::DisparityShift;
use rayon::prelude::*;
use sbs_core::{Frame, PixelFormat, Result, StereoError};
use tracing::trace;

/// Builds SBS frames from monoscopic RGBA frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct StereoSynthesizer {
    pub shift: DisparityShift,
}

impl StereoSynthesizer {
    pub fn new(shift: DisparityShift) -> Self {
        Self { shift }
    }

    /// Synthesize the stereo pair for one frame.
    pub fn synthesize(&self, frame: &Frame) -> Result<Frame> {
        if frame.format() != PixelFormat::Rgba8 {
            return Err(StereoError::UnsupportedFormat(format!(
                "stereo synthesis needs rgba, got {}",
                frame.format()
            )));
        }

        let (width, height) = (frame.width(), frame.height());
        let out_width = width.checked_mul(2).ok_or_else(|| {
            StereoError::InvalidParameter(format!("frame width {} too large", width))
        })?;
        let mut out = vec![0u8; PixelFormat::Rgba8.frame_size(out_width, height)];

        if !frame.is_empty() {
            let shift_px = self.shift.pixels(width);
            let src_stride = width as usize * 4;
            let dst_stride = src_stride * 2;
            trace!(width, height, shift_px, "Synthesizing stereo pair");

            out.par_chunks_mut(dst_stride)
                .zip(frame.data().par_chunks(src_stride))
                .for_each(|(dst, src)| write_row(dst, src, width, shift_px));
        }

        Frame::new(
            out,
            out_width,
            height,
            PixelFormat::Rgba8,
            frame.timestamp_ms(),
        )
    }
}

/// Fill one destination row (`2 * width` pixels) from one source row.
#[inline]
fn write_row(dst: &mut [u8], src: &[u8], width: u32, shift_px: i64) {
    let (left, right) = dst.split_at_mut(src.len());
    left.copy_from_slice(src);

    let last = width as i64 - 1;
    for (x, px) in right.chunks_exact_mut(4).enumerate() {
        let sx = (x as i64 + shift_px).clamp(0, last) as usize * 4;
        px.copy_from_slice(&src[sx..sx + 4]);
    }
}

/// Convenience wrapper: synthesize with a shift given in percent.
pub fn synthesize_sbs(frame: &Frame, shift_percent: f64) -> Result<Frame> {
    StereoSynthesizer::new(DisparityShift::new(shift_percent)).synthesize(frame)
}
