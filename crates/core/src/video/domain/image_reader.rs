use std::path::Path;

use crate::shared::frame::Frame;

/// Decodes a single image file into an RGB frame.
pub trait ImageReader: Send {
    fn read(&self, path: &Path, index: usize) -> Result<Frame, Box<dyn std::error::Error>>;
}
