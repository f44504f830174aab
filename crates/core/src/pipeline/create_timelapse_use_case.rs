use std::path::{Path, PathBuf};

use crate::shared::constants::{DEFAULT_DECAY, DEFAULT_STRIDE, OUTPUT_VIDEO_NAME};
use crate::shared::frame_sequence::FrameFormat;
use crate::shared::run_metadata::RunMetadata;

use super::encode_sequence_use_case::EncodeSequenceUseCase;
use super::sample_and_blend_use_case::{SampleAndBlendUseCase, SamplingParams};
use super::timelapse_error::TimelapseError;

/// Everything one timelapse run needs. Values are validated by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelapseParams {
    pub input: PathBuf,
    pub stride: usize,
    pub decay: f32,
    pub output_dir: PathBuf,
    pub frame_format: FrameFormat,
    /// H.264 CRF; `None` keeps the encoder default.
    pub quality: Option<u32>,
}

impl TimelapseParams {
    pub fn new(input: &Path, stride: usize, decay: f32, output_dir: &Path) -> Self {
        Self {
            input: input.to_path_buf(),
            stride,
            decay,
            output_dir: output_dir.to_path_buf(),
            frame_format: FrameFormat::default(),
            quality: None,
        }
    }

    /// Default stride and decay.
    pub fn with_defaults(input: &Path, output_dir: &Path) -> Self {
        Self::new(input, DEFAULT_STRIDE, DEFAULT_DECAY, output_dir)
    }

    pub fn with_frame_format(mut self, format: FrameFormat) -> Self {
        self.frame_format = format;
        self
    }

    pub fn with_quality(mut self, crf: u32) -> Self {
        self.quality = Some(crf);
        self
    }

    pub fn sampling(&self) -> SamplingParams {
        SamplingParams {
            stride: self.stride,
            decay: self.decay,
            frame_format: self.frame_format,
        }
    }

    pub fn output_video_path(&self) -> PathBuf {
        self.output_dir.join(OUTPUT_VIDEO_NAME)
    }
}

/// Result of a successful run.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelapseReport {
    /// `None` when the source had no frames and nothing was encoded.
    pub video_path: Option<PathBuf>,
    pub frame_paths: Vec<PathBuf>,
    pub metadata: RunMetadata,
}

impl TimelapseReport {
    pub fn status_message(&self) -> String {
        match &self.video_path {
            Some(path) => format!(
                "Timelapse created: {} ({} frames)",
                path.display(),
                self.metadata.output_frame_count
            ),
            None => "No frames decoded from the input video; nothing to encode".to_string(),
        }
    }
}

/// Sample/blend into numbered images, then encode them into `timelapse.mp4`.
pub struct CreateTimelapseUseCase {
    sampler: SampleAndBlendUseCase,
    encoder: EncodeSequenceUseCase,
}

impl CreateTimelapseUseCase {
    pub fn new(sampler: SampleAndBlendUseCase, encoder: EncodeSequenceUseCase) -> Self {
        Self { sampler, encoder }
    }

    pub fn execute(&mut self, params: &TimelapseParams) -> Result<TimelapseReport, TimelapseError> {
        let sampled = self
            .sampler
            .execute(&params.input, &params.sampling(), &params.output_dir)?;

        if sampled.sequence.is_empty() {
            log::warn!("{} yielded no frames", params.input.display());
            return Ok(TimelapseReport {
                video_path: None,
                frame_paths: Vec::new(),
                metadata: sampled.metadata,
            });
        }

        let video_path = self.encoder.execute(
            sampled.sequence.paths(),
            sampled.metadata.output_fps,
            &params.output_video_path(),
        )?;

        Ok(TimelapseReport {
            video_path: Some(video_path),
            frame_paths: sampled.sequence.paths().to_vec(),
            metadata: sampled.metadata,
        })
    }
}
