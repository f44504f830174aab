use ndarray::{Array3, Zip};
use thiserror::Error;

use crate::blending::domain::pixel_conversion::{normalize, quantize};
use crate::shared::constants::FRAME_CHANNELS;
use crate::shared::frame::Frame;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BlendError {
    #[error("frame {index} is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        index: usize,
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
}

/// Running exponential moving average of sampled frames.
///
/// Formula: `acc[k] = acc[k-1] * (1 - decay) + frame[k] * decay`, with
/// `acc[-1] = 0`. The first blended frame is therefore `decay * frame[0]`.
pub struct BlendAccumulator {
    buffer: Array3<f32>,
    decay: f32,
    width: u32,
    height: u32,
    blended: usize,
}

impl BlendAccumulator {
    /// `decay` must lie in `(0, 1]`; callers validate it.
    pub fn new(width: u32, height: u32, decay: f32) -> Self {
        debug_assert!(decay > 0.0 && decay <= 1.0, "decay must be in (0, 1]");
        Self {
            buffer: Array3::zeros((height as usize, width as usize, FRAME_CHANNELS as usize)),
            decay,
            width,
            height,
            blended: 0,
        }
    }

    /// Folds `frame` into the running average and returns the quantized result.
    ///
    /// The returned frame's index is its position among blended frames.
    pub fn blend(&mut self, frame: &Frame) -> Result<Frame, BlendError> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(BlendError::DimensionMismatch {
                index: frame.index(),
                expected_width: self.width,
                expected_height: self.height,
                actual_width: frame.width(),
                actual_height: frame.height(),
            });
        }

        let sample = normalize(frame);
        let decay = self.decay;
        let retain = 1.0 - decay;
        Zip::from(&mut self.buffer)
            .and(&sample)
            .for_each(|acc, &s| *acc = *acc * retain + s * decay);

        let blended = quantize(&self.buffer, self.blended);
        self.blended += 1;
        Ok(blended)
    }

    pub fn buffer(&self) -> &Array3<f32> {
        &self.buffer
    }

    /// Number of frames folded in so far.
    pub fn blended_count(&self) -> usize {
        self.blended
    }
}
