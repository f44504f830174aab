use std::fmt;

use serde::Serialize;

use crate::shared::video_metadata::VideoMetadata;

/// Summary of one timelapse run: what was read and what was produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunMetadata {
    /// Frames actually decoded from the source.
    pub input_frame_count: usize,
    /// Frame count the container claimed before decoding.
    pub reported_frame_count: usize,
    pub input_fps: f64,
    pub width: u32,
    pub height: u32,
    pub output_frame_count: usize,
    pub output_fps: u32,
    pub stride: usize,
    pub decay: f32,
}

impl RunMetadata {
    pub fn new(
        source: &VideoMetadata,
        input_frame_count: usize,
        output_frame_count: usize,
        output_fps: u32,
        stride: usize,
        decay: f32,
    ) -> Self {
        Self {
            input_frame_count,
            reported_frame_count: source.total_frames,
            input_fps: source.fps,
            width: source.width,
            height: source.height,
            output_frame_count,
            output_fps,
            stride,
            decay,
        }
    }

    /// Playback length of the output video in seconds.
    pub fn output_duration_secs(&self) -> f64 {
        if self.output_fps == 0 {
            return 0.0;
        }
        self.output_frame_count as f64 / f64::from(self.output_fps)
    }
}

impl fmt::Display for RunMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Input:  {} frames ({} reported), {:.2} fps, {}x{}",
            self.input_frame_count,
            self.reported_frame_count,
            self.input_fps,
            self.width,
            self.height
        )?;
        write!(
            f,
            "Output: {} frames, {} fps ({:.1}s), stride {}, decay {}",
            self.output_frame_count,
            self.output_fps,
            self.output_duration_secs(),
            self.stride,
            self.decay
        )
    }
}
