use std::path::Path;
use std::time::Instant;

use crate::blending::domain::blend_accumulator::BlendAccumulator;
use crate::blending::domain::frame_sampler::FrameSampler;
use crate::shared::constants::OUTPUT_FPS;
use crate::shared::frame_sequence::{FrameFormat, FrameSequence};
use crate::shared::run_metadata::RunMetadata;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;

use super::pipeline_logger::{elapsed_ms, NullPipelineLogger, PipelineLogger};
use super::timelapse_error::TimelapseError;

/// Parameters of the sampling stage. Validated by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplingParams {
    /// Sample one frame every `stride` source frames (>= 1).
    pub stride: usize,
    /// Weight of the newest sample in the blend, in `(0, 1]`.
    pub decay: f32,
    pub frame_format: FrameFormat,
}

/// Blended frames written to disk plus the run's metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct SampledSequence {
    pub sequence: FrameSequence,
    pub metadata: RunMetadata,
}

/// Decode → sample → blend → write image, one source frame at a time.
pub struct SampleAndBlendUseCase {
    reader: Box<dyn VideoReader>,
    image_writer: Box<dyn ImageWriter>,
    logger: Box<dyn PipelineLogger>,
}

impl SampleAndBlendUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        image_writer: Box<dyn ImageWriter>,
        logger: Option<Box<dyn PipelineLogger>>,
    ) -> Self {
        Self {
            reader,
            image_writer,
            logger: logger.unwrap_or_else(|| Box::new(NullPipelineLogger)),
        }
    }

    /// Samples `input` and writes blended frames as `frame_NNNN.<ext>` into
    /// `output_dir`.
    ///
    /// The source is closed on every exit path. Frames already written when
    /// an error occurs are left on disk.
    pub fn execute(
        &mut self,
        input: &Path,
        params: &SamplingParams,
        output_dir: &Path,
    ) -> Result<SampledSequence, TimelapseError> {
        let (mut source, source_meta) = OpenSource::open(self.reader.as_mut(), input)?;
        self.logger.info(&format!(
            "Sampling {} ({}x{} @ {:.2} fps, ~{} frames): stride {}, decay {}",
            input.display(),
            source_meta.width,
            source_meta.height,
            source_meta.fps,
            source_meta.total_frames,
            params.stride,
            params.decay
        ));

        let sampler = FrameSampler::new(params.stride);
        let mut accumulator =
            BlendAccumulator::new(source_meta.width, source_meta.height, params.decay);
        let mut sequence = FrameSequence::new(output_dir, params.frame_format);
        let mut counter = 0usize;

        let mut frames = source.reader.frames();
        loop {
            let start = Instant::now();
            let Some(next) = frames.next() else {
                break;
            };
            let frame = next.map_err(|e| TimelapseError::Decode {
                frame_index: counter,
                message: e.to_string(),
            })?;
            self.logger.timing("decode", elapsed_ms(start));

            if sampler.is_sampled(counter) {
                let start = Instant::now();
                let blended = accumulator
                    .blend(&frame)
                    .map_err(|e| TimelapseError::Decode {
                        frame_index: counter,
                        message: e.to_string(),
                    })?;
                self.logger.timing("blend", elapsed_ms(start));

                let start = Instant::now();
                let path = sequence.next_path();
                if let Err(e) = self.image_writer.write(&path, &blended) {
                    return Err(TimelapseError::Write {
                        path,
                        message: e.to_string(),
                    });
                }
                self.logger.timing("write", elapsed_ms(start));
                sequence.push(path);
            }

            counter += 1;
            self.logger.progress(counter, source_meta.total_frames);
        }
        drop(frames);
        drop(source);

        debug_assert_eq!(sequence.len(), sampler.expected_output_count(counter));

        let metadata = RunMetadata::new(
            &source_meta,
            counter,
            sequence.len(),
            OUTPUT_FPS,
            sampler.stride(),
            params.decay,
        );
        self.logger.info(&format!(
            "Sampled {} of {} frames into {}",
            sequence.len(),
            counter,
            output_dir.display()
        ));
        self.logger.summary();

        Ok(SampledSequence { sequence, metadata })
    }
}

/// Opened video source that is closed when dropped.
struct OpenSource<'a> {
    reader: &'a mut dyn VideoReader,
}

impl<'a> OpenSource<'a> {
    fn open(
        reader: &'a mut dyn VideoReader,
        path: &Path,
    ) -> Result<(Self, VideoMetadata), TimelapseError> {
        let source = Self { reader };
        let metadata = source
            .reader
            .open(path)
            .map_err(|e| TimelapseError::SourceOpen {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok((source, metadata))
    }
}

impl Drop for OpenSource<'_> {
    fn drop(&mut self) {
        self.reader.close();
    }
}
