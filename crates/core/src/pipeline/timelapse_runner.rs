use crate::shared::run_metadata::RunMetadata;
use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;
use crate::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use crate::video::infrastructure::image_file_reader::ImageFileReader;
use crate::video::infrastructure::image_file_writer::ImageFileWriter;

use super::create_timelapse_use_case::{CreateTimelapseUseCase, TimelapseParams};
use super::encode_sequence_use_case::EncodeSequenceUseCase;
use super::pipeline_logger::StdoutPipelineLogger;
use super::sample_and_blend_use_case::SampleAndBlendUseCase;

const PROGRESS_THROTTLE_FRAMES: usize = 50;

/// Wires the ffmpeg/image-crate adapters into a [`CreateTimelapseUseCase`].
pub fn build_use_case(params: &TimelapseParams) -> CreateTimelapseUseCase {
    let writer = match params.quality {
        Some(crf) => FfmpegWriter::new().with_crf(crf),
        None => FfmpegWriter::new(),
    };

    let sampler = SampleAndBlendUseCase::new(
        Box::new(FfmpegReader::new()),
        Box::new(ImageFileWriter::new()),
        Some(Box::new(StdoutPipelineLogger::new(
            "Sampling",
            PROGRESS_THROTTLE_FRAMES,
        ))),
    );
    let encoder = EncodeSequenceUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(writer),
        Some(Box::new(StdoutPipelineLogger::new(
            "Encoding",
            PROGRESS_THROTTLE_FRAMES,
        ))),
    );
    CreateTimelapseUseCase::new(sampler, encoder)
}

/// Runs a whole timelapse and flattens any failure into one message.
///
/// Returns the status message and the run metadata on success.
pub fn run(params: &TimelapseParams) -> Result<(String, RunMetadata), String> {
    let mut use_case = build_use_case(params);
    match use_case.execute(params) {
        Ok(report) => Ok((report.status_message(), report.metadata)),
        Err(e) => {
            log::error!("Timelapse failed during {}: {e}", e.stage());
            Err(e.to_string())
        }
    }
}
