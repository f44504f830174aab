use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::image_reader::ImageReader;
use crate::video::domain::video_writer::VideoWriter;

use super::pipeline_logger::{elapsed_ms, NullPipelineLogger, PipelineLogger};
use super::timelapse_error::TimelapseError;

/// Reads an ordered list of frame images and encodes them into one video.
pub struct EncodeSequenceUseCase {
    image_reader: Box<dyn ImageReader>,
    writer: Box<dyn VideoWriter>,
    logger: Box<dyn PipelineLogger>,
}

impl EncodeSequenceUseCase {
    pub fn new(
        image_reader: Box<dyn ImageReader>,
        writer: Box<dyn VideoWriter>,
        logger: Option<Box<dyn PipelineLogger>>,
    ) -> Self {
        Self {
            image_reader,
            writer,
            logger: logger.unwrap_or_else(|| Box::new(NullPipelineLogger)),
        }
    }

    /// Encodes `frame_paths` in order at `fps` into `output_path`, replacing
    /// any existing file. Nothing is left at `output_path` on failure.
    pub fn execute(
        &mut self,
        frame_paths: &[PathBuf],
        fps: u32,
        output_path: &Path,
    ) -> Result<PathBuf, TimelapseError> {
        let Some(first_path) = frame_paths.first() else {
            return Err(TimelapseError::EmptySequence);
        };
        let first = self.read_frame(first_path, 0)?;
        let (width, height) = first.dimensions();

        self.logger.info(&format!(
            "Encoding {} frames ({}x{}) at {} fps into {}",
            frame_paths.len(),
            width,
            height,
            fps,
            output_path.display()
        ));

        let metadata = VideoMetadata::for_output(width, height, fps, frame_paths.len());
        if let Err(e) = self.writer.open(output_path, &metadata) {
            self.writer.abort();
            return Err(TimelapseError::Encode {
                message: e.to_string(),
            });
        }

        if let Err(e) = self.write_all(first, frame_paths) {
            self.writer.abort();
            return Err(e);
        }

        let start = Instant::now();
        if let Err(e) = self.writer.close() {
            self.writer.abort();
            return Err(TimelapseError::Write {
                path: output_path.to_path_buf(),
                message: e.to_string(),
            });
        }
        self.logger.timing("finalize", elapsed_ms(start));
        self.logger.summary();

        Ok(output_path.to_path_buf())
    }

    fn write_all(&mut self, first: Frame, frame_paths: &[PathBuf]) -> Result<(), TimelapseError> {
        let expected = first.dimensions();
        let total = frame_paths.len();
        self.write_frame(&first)?;
        self.logger.progress(1, total);

        for (index, path) in frame_paths.iter().enumerate().skip(1) {
            let frame = self.read_frame(path, index)?;
            if frame.dimensions() != expected {
                return Err(TimelapseError::FrameImage {
                    path: path.clone(),
                    message: format!(
                        "frame is {}x{}, expected {}x{}",
                        frame.width(),
                        frame.height(),
                        expected.0,
                        expected.1
                    ),
                });
            }
            self.write_frame(&frame)?;
            self.logger.progress(index + 1, total);
        }
        Ok(())
    }

    fn read_frame(&mut self, path: &Path, index: usize) -> Result<Frame, TimelapseError> {
        let start = Instant::now();
        let frame = self
            .image_reader
            .read(path, index)
            .map_err(|e| TimelapseError::FrameImage {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        self.logger.timing("read", elapsed_ms(start));
        Ok(frame)
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<(), TimelapseError> {
        let start = Instant::now();
        self.writer
            .write(frame)
            .map_err(|e| TimelapseError::Encode {
                message: format!("frame {}: {e}", frame.index()),
            })?;
        self.logger.timing("encode", elapsed_ms(start));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame_sequence::{FrameFormat, FrameSequence};
    use crate::video::domain::image_writer::ImageWriter;
    use crate::video::domain::video_reader::VideoReader;
    use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;
    use crate::video::infrastructure::ffmpeg_writer::FfmpegWriter;
    use crate::video::infrastructure::image_file_reader::ImageFileReader;
    use crate::video::infrastructure::image_file_writer::ImageFileWriter;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    /// Serves frames from memory by path; unknown paths fail like a missing file.
    struct StubImageReader {
        frames: HashMap<PathBuf, Frame>,
    }

    impl ImageReader for StubImageReader {
        fn read(&self, path: &Path, index: usize) -> Result<Frame, Box<dyn std::error::Error>> {
            let frame = self
                .frames
                .get(path)
                .ok_or_else(|| format!("No such file or directory: {}", path.display()))?;
            Ok(Frame::new(
                frame.data().to_vec(),
                frame.width(),
                frame.height(),
                index,
            ))
        }
    }

    #[derive(Default)]
    struct WriterLog {
        opened: Option<(PathBuf, VideoMetadata)>,
        frames: Vec<Frame>,
        closed: bool,
        aborted: bool,
    }

    struct StubVideoWriter {
        log: Arc<Mutex<WriterLog>>,
        fail_open: bool,
        fail_close: bool,
    }

    impl StubVideoWriter {
        fn new() -> (Self, Arc<Mutex<WriterLog>>) {
            let log = Arc::new(Mutex::new(WriterLog::default()));
            let writer = Self {
                log: log.clone(),
                fail_open: false,
                fail_close: false,
            };
            (writer, log)
        }
    }

    impl VideoWriter for StubVideoWriter {
        fn open(
            &mut self,
            path: &Path,
            metadata: &VideoMetadata,
        ) -> Result<(), Box<dyn std::error::Error>> {
            if self.fail_open {
                return Err("Encoder not found".into());
            }
            self.log.lock().unwrap().opened = Some((path.to_path_buf(), metadata.clone()));
            Ok(())
        }

        fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.log.lock().unwrap().frames.push(frame.clone());
            Ok(())
        }

        fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
            if self.fail_close {
                return Err("Permission denied".into());
            }
            self.log.lock().unwrap().closed = true;
            Ok(())
        }

        fn abort(&mut self) {
            self.log.lock().unwrap().aborted = true;
        }
    }

    // --- Helpers ---

    fn sequence_of(count: usize) -> (Vec<PathBuf>, HashMap<PathBuf, Frame>) {
        let seq = FrameSequence::new(Path::new("frames"), FrameFormat::Png);
        let mut paths = Vec::new();
        let mut frames = HashMap::new();
        for i in 0..count {
            let path = seq.path_for(i);
            let v = (i * 30) as u8;
            frames.insert(path.clone(), Frame::filled(6, 4, [v, v, v], 0));
            paths.push(path);
        }
        (paths, frames)
    }

    fn use_case(
        frames: HashMap<PathBuf, Frame>,
        writer: StubVideoWriter,
    ) -> EncodeSequenceUseCase {
        EncodeSequenceUseCase::new(
            Box::new(StubImageReader { frames }),
            Box::new(writer),
            None,
        )
    }

    // --- Tests ---

    #[test]
    fn test_frames_written_in_order_at_target_fps() {
        let (paths, frames) = sequence_of(5);
        let (writer, log) = StubVideoWriter::new();
        let mut uc = use_case(frames, writer);

        let out = uc.execute(&paths, 30, Path::new("out/timelapse.mp4")).unwrap();
        assert_eq!(out, PathBuf::from("out/timelapse.mp4"));

        let log = log.lock().unwrap();
        let (opened_path, meta) = log.opened.clone().unwrap();
        assert_eq!(opened_path, PathBuf::from("out/timelapse.mp4"));
        assert_eq!((meta.width, meta.height), (6, 4));
        assert_eq!(meta.fps, 30.0);
        assert_eq!(meta.total_frames, 5);

        let values: Vec<u8> = log.frames.iter().map(|f| f.data()[0]).collect();
        assert_eq!(values, vec![0, 30, 60, 90, 120]);
        let indices: Vec<usize> = log.frames.iter().map(Frame::index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert!(log.closed);
        assert!(!log.aborted);
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        let (writer, log) = StubVideoWriter::new();
        let mut uc = use_case(HashMap::new(), writer);

        let err = uc.execute(&[], 30, Path::new("out.mp4")).unwrap_err();
        assert!(matches!(err, TimelapseError::EmptySequence));
        assert!(log.lock().unwrap().opened.is_none());
    }

    #[test]
    fn test_missing_image_aborts_encoding() {
        let (mut paths, frames) = sequence_of(3);
        paths.insert(2, PathBuf::from("frames/frame_9999.png"));
        let (writer, log) = StubVideoWriter::new();
        let mut uc = use_case(frames, writer);

        let err = uc.execute(&paths, 30, Path::new("out.mp4")).unwrap_err();
        match err {
            TimelapseError::FrameImage { path, .. } => {
                assert_eq!(path, PathBuf::from("frames/frame_9999.png"))
            }
            other => panic!("expected frame image error, got {other:?}"),
        }
        let log = log.lock().unwrap();
        assert!(log.aborted);
        assert!(!log.closed);
        assert_eq!(log.frames.len(), 2);
    }

    #[test]
    fn test_missing_first_image_fails_before_opening() {
        let (writer, log) = StubVideoWriter::new();
        let mut uc = use_case(HashMap::new(), writer);

        let err = uc
            .execute(&[PathBuf::from("gone.png")], 30, Path::new("out.mp4"))
            .unwrap_err();
        assert!(matches!(err, TimelapseError::FrameImage { .. }));
        assert!(log.lock().unwrap().opened.is_none());
    }

    #[test]
    fn test_mismatched_dimensions_abort_encoding() {
        let (paths, mut frames) = sequence_of(3);
        frames.insert(paths[1].clone(), Frame::filled(8, 8, [1, 2, 3], 0));
        let (writer, log) = StubVideoWriter::new();
        let mut uc = use_case(frames, writer);

        let err = uc.execute(&paths, 30, Path::new("out.mp4")).unwrap_err();
        assert!(matches!(err, TimelapseError::FrameImage { .. }));
        assert!(err.to_string().contains("expected 6x4"));
        assert!(log.lock().unwrap().aborted);
    }

    #[test]
    fn test_open_failure_is_encode_error() {
        let (paths, frames) = sequence_of(2);
        let (mut writer, log) = StubVideoWriter::new();
        writer.fail_open = true;
        let mut uc = use_case(frames, writer);

        let err = uc.execute(&paths, 30, Path::new("out.mp4")).unwrap_err();
        assert!(matches!(err, TimelapseError::Encode { .. }));
        assert!(log.lock().unwrap().aborted);
    }

    #[test]
    fn test_close_failure_is_write_error() {
        let (paths, frames) = sequence_of(2);
        let (mut writer, log) = StubVideoWriter::new();
        writer.fail_close = true;
        let mut uc = use_case(frames, writer);

        let err = uc.execute(&paths, 30, Path::new("out.mp4")).unwrap_err();
        match err {
            TimelapseError::Write { path, .. } => assert_eq!(path, PathBuf::from("out.mp4")),
            other => panic!("expected write error, got {other:?}"),
        }
        assert!(log.lock().unwrap().aborted);
    }

    #[test]
    fn test_encodes_real_images_into_playable_video() {
        let dir = tempfile::tempdir().unwrap();
        let mut seq = FrameSequence::new(dir.path(), FrameFormat::Png);
        let image_writer = ImageFileWriter::new();
        for i in 0..6u8 {
            let path = seq.next_path();
            image_writer
                .write(&path, &Frame::filled(64, 48, [i * 40, 100, 200], i as usize))
                .unwrap();
            seq.push(path);
        }

        let output = dir.path().join("timelapse.mp4");
        let mut uc = EncodeSequenceUseCase::new(
            Box::new(ImageFileReader::new()),
            Box::new(FfmpegWriter::new()),
            None,
        );
        uc.execute(seq.paths(), 30, &output).unwrap();
        assert!(output.exists());

        let mut reader = FfmpegReader::new();
        let meta = reader.open(&output).unwrap();
        assert_eq!((meta.width, meta.height), (64, 48));
        assert!((meta.fps - 30.0).abs() < 0.5);
        let decoded = reader.frames().filter_map(Result::ok).count();
        reader.close();
        assert_eq!(decoded, 6);
    }

    #[test]
    fn test_corrupt_image_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("frame_0000.png");
        ImageFileWriter::new()
            .write(&first, &Frame::filled(32, 32, [10, 20, 30], 0))
            .unwrap();
        let broken = dir.path().join("frame_0001.png");
        std::fs::write(&broken, b"not a png").unwrap();

        let output = dir.path().join("timelapse.mp4");
        let mut uc = EncodeSequenceUseCase::new(
            Box::new(ImageFileReader::new()),
            Box::new(FfmpegWriter::new()),
            None,
        );
        let err = uc.execute(&[first, broken], 30, &output).unwrap_err();
        assert!(matches!(err, TimelapseError::FrameImage { .. }));
        assert!(!output.exists());
    }
}
