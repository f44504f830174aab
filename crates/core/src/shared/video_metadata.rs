use std::path::PathBuf;

/// Stream properties of an opened video, or of a video about to be written.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Frame count as reported by the container. May be 0 or inaccurate.
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Metadata for an output stream of `width`x`height` frames at `fps`.
    pub fn for_output(width: u32, height: u32, fps: u32, total_frames: usize) -> Self {
        Self {
            width,
            height,
            fps: f64::from(fps),
            total_frames,
            codec: String::new(),
            source_path: None,
        }
    }
}
