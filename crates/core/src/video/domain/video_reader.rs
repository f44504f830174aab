use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Sequential frame source over a video file.
///
/// Implementations handle container and codec details; the pipeline only
/// sees RGB [`Frame`]s in decode order and the stream's [`VideoMetadata`].
pub trait VideoReader: Send {
    /// Opens the file, positioned at its first frame, and returns its metadata.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over the remaining frames. `None` is end-of-stream.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases the underlying handle. Must be safe to call more than once.
    fn close(&mut self);
}
