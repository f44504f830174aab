/// Output frame rate of every timelapse video.
pub const OUTPUT_FPS: u32 = 30;

pub const FRAME_FILE_PREFIX: &str = "frame_";

/// Minimum zero-padded width of the frame index in frame file names.
pub const FRAME_INDEX_WIDTH: usize = 4;

pub const OUTPUT_VIDEO_NAME: &str = "timelapse.mp4";

pub const DEFAULT_STRIDE: usize = 5;
pub const DEFAULT_DECAY: f32 = 0.5;

/// Number of channels in every decoded or blended frame (RGB).
pub const FRAME_CHANNELS: u8 = 3;
