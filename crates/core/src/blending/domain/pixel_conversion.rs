//! Conversions between 8-bit frames and normalized float buffers.
//!
//! `float = int / 255`, `int = round(float * 255)` clamped to `[0, 255]`.

use ndarray::Array3;

use crate::shared::frame::Frame;

pub fn normalize_value(value: u8) -> f32 {
    f32::from(value) / 255.0
}

pub fn quantize_value(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Float buffer shaped `(height, width, channels)` with values in `[0, 1]`.
pub fn normalize(frame: &Frame) -> Array3<f32> {
    frame.as_ndarray().mapv(normalize_value)
}

/// Quantizes a float buffer back into an 8-bit frame.
pub fn quantize(buffer: &Array3<f32>, index: usize) -> Frame {
    let (height, width, _) = buffer.dim();
    let data = buffer.iter().copied().map(quantize_value).collect();
    Frame::new(data, width as u32, height as u32, index)
}
