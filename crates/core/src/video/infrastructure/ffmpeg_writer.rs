use std::path::{Path, PathBuf};

use crate::shared::constants::OUTPUT_FPS;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Encodes RGB frames into a video file via ffmpeg-next.
///
/// Frames are encoded into a hidden sibling file (`.<stem>.partial.<ext>`)
/// which replaces the requested path only after the trailer is written, so a
/// failed encode never leaves a truncated file behind under the final name.
///
/// Uses libx264 when the linked ffmpeg provides it and falls back to MPEG-4
/// Part 2 otherwise. Odd dimensions are rounded down to even for YUV420P.
pub struct FfmpegWriter {
    output_path: Option<PathBuf>,
    partial_path: Option<PathBuf>,
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    width: u32,
    height: u32,
    fps: i32,
    frame_count: usize,
    crf: Option<u32>,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self {
            output_path: None,
            partial_path: None,
            octx: None,
            encoder: None,
            scaler: None,
            width: 0,
            height: 0,
            fps: OUTPUT_FPS as i32,
            frame_count: 0,
            crf: None,
        }
    }

    /// H.264 constant rate factor (0 = lossless, 51 = worst). Ignored by the
    /// MPEG-4 fallback encoder.
    pub fn with_crf(mut self, crf: u32) -> Self {
        self.crf = Some(crf);
        self
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    fn encode_trailer(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(encoder), Some(octx)) = (self.encoder.as_mut(), self.octx.as_mut()) else {
            return Ok(());
        };
        encoder.send_eof()?;
        drain_packets(encoder, octx, self.fps)?;
        octx.write_trailer()?;
        Ok(())
    }

    fn release_contexts(&mut self) {
        self.scaler = None;
        self.encoder = None;
        self.octx = None;
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        if metadata.width < 2 || metadata.height < 2 {
            return Err(format!(
                "cannot encode {}x{} frames: both dimensions must be at least 2",
                metadata.width, metadata.height
            )
            .into());
        }

        let fps_i = metadata.fps.round() as i32;
        let fps_i = if fps_i <= 0 { OUTPUT_FPS as i32 } else { fps_i };
        let encoded_width = metadata.width & !1;
        let encoded_height = metadata.height & !1;

        let partial_path = partial_path_for(path);
        let mut octx = ffmpeg_next::format::output(&partial_path)?;
        // Registered before anything can fail so abort() cleans up the file.
        self.partial_path = Some(partial_path);

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let (codec, is_h264) = select_codec().ok_or("no H.264 or MPEG-4 encoder available")?;
        let mut ost = octx.add_stream(Some(codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        encoder_ctx.set_width(encoded_width);
        encoder_ctx.set_height(encoded_height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps_i));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps_i, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let mut options = ffmpeg_next::Dictionary::new();
        match (self.crf, is_h264) {
            (Some(crf), true) => options.set("crf", &crf.to_string()),
            (Some(_), false) => log::warn!("CRF quality ignored: libx264 is not available"),
            _ => {}
        }

        let encoder = encoder_ctx.open_with(options)?;
        ost.set_parameters(&encoder);

        octx.write_header()?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::YUV420P,
            encoded_width,
            encoded_height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::debug!(
            "Encoding {}x{} @ {fps_i} fps with {} into {}",
            encoded_width,
            encoded_height,
            codec.name(),
            path.display()
        );

        self.output_path = Some(path.to_path_buf());
        self.width = metadata.width;
        self.height = metadata.height;
        self.fps = fps_i;
        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.frame_count = 0;

        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(encoder), Some(scaler), Some(octx)) = (
            self.encoder.as_mut(),
            self.scaler.as_mut(),
            self.octx.as_mut(),
        ) else {
            return Err("FfmpegWriter: not opened".into());
        };

        if frame.dimensions() != (self.width, self.height) {
            return Err(format!(
                "frame {} is {}x{}, encoder expects {}x{}",
                frame.index(),
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )
            .into());
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            self.width,
            self.height,
        );

        let stride = rgb_frame.stride(0);
        let row_len = self.width as usize * 3;
        let data = rgb_frame.data_mut(0);
        for (row, src_row) in frame.data().chunks_exact(row_len).enumerate() {
            let dst_start = row * stride;
            data[dst_start..dst_start + row_len].copy_from_slice(src_row);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(self.frame_count as i64));

        encoder.send_frame(&yuv_frame)?;
        drain_packets(encoder, octx, self.fps)?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Err(e) = self.encode_trailer() {
            self.abort();
            return Err(e);
        }
        self.release_contexts();

        if let (Some(partial), Some(output)) = (self.partial_path.take(), self.output_path.take()) {
            if let Err(e) = std::fs::rename(&partial, &output) {
                let _ = std::fs::remove_file(&partial);
                return Err(format!("failed to move video into {}: {e}", output.display()).into());
            }
            log::debug!("Wrote {} frames to {}", self.frame_count, output.display());
        }

        Ok(())
    }

    fn abort(&mut self) {
        self.release_contexts();
        self.output_path = None;
        if let Some(partial) = self.partial_path.take() {
            if partial.exists() {
                if let Err(e) = std::fs::remove_file(&partial) {
                    log::warn!("Failed to remove partial video {}: {e}", partial.display());
                }
            }
        }
    }
}

impl Drop for FfmpegWriter {
    fn drop(&mut self) {
        if self.partial_path.is_some() {
            self.abort();
        }
    }
}

/// Prefers libx264; returns the codec and whether it is H.264.
fn select_codec() -> Option<(ffmpeg_next::codec::Codec, bool)> {
    if let Some(codec) = ffmpeg_next::encoder::find_by_name("libx264") {
        return Some((codec, true));
    }
    ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4).map(|codec| (codec, false))
}

fn drain_packets(
    encoder: &mut ffmpeg_next::codec::encoder::video::Encoder,
    octx: &mut ffmpeg_next::format::context::Output,
    fps: i32,
) -> Result<(), Box<dyn std::error::Error>> {
    let ost_time_base = octx
        .stream(0)
        .ok_or("output stream missing")?
        .time_base();

    let mut encoded = ffmpeg_next::Packet::empty();
    while encoder.receive_packet(&mut encoded).is_ok() {
        encoded.set_stream(0);
        encoded.rescale_ts(ffmpeg_next::Rational(1, fps), ost_time_base);
        encoded.write_interleaved(octx)?;
    }
    Ok(())
}

/// `out/timelapse.mp4` -> `out/.timelapse.partial.mp4`.
///
/// The extension is kept so ffmpeg still picks the container from it.
fn partial_path_for(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!(".{stem}.partial.{ext}"),
        None => format!(".{stem}.partial"),
    };
    path.with_file_name(name)
}
