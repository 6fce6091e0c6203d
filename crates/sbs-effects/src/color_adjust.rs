//! Brightness / contrast / saturation stage applied before synthesis.

use rayon::prelude::*;
use sbs_core::{ColorAdjustment, Frame, PixelFormat, Result, StereoError};

/// Contrast pivots around this channel value.
const MIDPOINT: f32 = 128.0;

/// Rows handed to each rayon task.
const ROWS_PER_TASK: usize = 16;

/// Apply brightness, contrast, then saturation to one RGB triple.
#[inline]
pub fn adjust_rgb(rgb: [u8; 3], adj: &ColorAdjustment) -> [u8; 3] {
    let mut c = [rgb[0] as f32, rgb[1] as f32, rgb[2] as f32];

    for v in c.iter_mut() {
        *v *= adj.brightness;
        *v = MIDPOINT + (*v - MIDPOINT) * adj.contrast;
    }

    let gray = (c[0] + c[1] + c[2]) / 3.0;
    let mut out = [0u8; 3];
    for (o, v) in out.iter_mut().zip(c) {
        *o = (gray + (v - gray) * adj.saturation).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Adjust an RGBA buffer in place. Alpha is left untouched.
pub fn adjust_rgba_in_place(data: &mut [u8], width: u32, adj: &ColorAdjustment) {
    let stride = width as usize * 4;
    if stride == 0 || adj.is_identity() {
        return;
    }
    data.par_chunks_mut(stride * ROWS_PER_TASK).for_each(|rows| {
        for px in rows.chunks_exact_mut(4) {
            let [r, g, b] = adjust_rgb([px[0], px[1], px[2]], adj);
            px[0] = r;
            px[1] = g;
            px[2] = b;
        }
    });
}

/// Color adjustment stage producing a new frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorAdjustStage {
    pub adjustment: ColorAdjustment,
}

impl ColorAdjustStage {
    pub fn new(adjustment: ColorAdjustment) -> Self {
        Self { adjustment }
    }

    /// Adjust an RGBA frame. Other formats are rejected.
    pub fn adjust(&self, frame: &Frame) -> Result<Frame> {
        if frame.format() != PixelFormat::Rgba8 {
            return Err(StereoError::UnsupportedFormat(format!(
                "color adjustment needs rgba, got {}",
                frame.format()
            )));
        }
        let mut data = frame.data().to_vec();
        adjust_rgba_in_place(&mut data, frame.width(), &self.adjustment);
        Frame::new(
            data,
            frame.width(),
            frame.height(),
            PixelFormat::Rgba8,
            frame.timestamp_ms(),
        )
    }
}
