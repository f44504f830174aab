use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Pipeline stage a [`TimelapseError`] originated in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Open,
    Decode,
    Write,
    Encode,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Open => "open",
            PipelineStage::Decode => "decode",
            PipelineStage::Write => "write",
            PipelineStage::Encode => "encode",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum TimelapseError {
    #[error("cannot open video {}: {message}", .path.display())]
    SourceOpen { path: PathBuf, message: String },
    #[error("failed to decode source frame {frame_index}: {message}")]
    Decode { frame_index: usize, message: String },
    #[error("failed to write {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },
    #[error("cannot encode an empty frame sequence")]
    EmptySequence,
    #[error("unusable frame image {}: {message}", .path.display())]
    FrameImage { path: PathBuf, message: String },
    #[error("video encoding failed: {message}")]
    Encode { message: String },
}

impl TimelapseError {
    pub fn stage(&self) -> PipelineStage {
        match self {
            TimelapseError::SourceOpen { .. } => PipelineStage::Open,
            TimelapseError::Decode { .. } => PipelineStage::Decode,
            TimelapseError::Write { .. } => PipelineStage::Write,
            TimelapseError::EmptySequence
            | TimelapseError::FrameImage { .. }
            | TimelapseError::Encode { .. } => PipelineStage::Encode,
        }
    }
}
