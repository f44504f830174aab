use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::shared::constants::{FRAME_FILE_PREFIX, FRAME_INDEX_WIDTH};

/// Image format used for the intermediate frame files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameFormat {
    #[default]
    Png,
    Jpeg,
}

impl FrameFormat {
    pub fn extension(self) -> &'static str {
        match self {
            FrameFormat::Png => "png",
            FrameFormat::Jpeg => "jpg",
        }
    }
}

impl FromStr for FrameFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(FrameFormat::Png),
            "jpg" | "jpeg" => Ok(FrameFormat::Jpeg),
            other => Err(format!("unknown frame format '{other}' (expected png or jpg)")),
        }
    }
}

/// Ordered blended frames of one run, materialized as numbered image files.
///
/// Insertion order is temporal order; the n-th pushed path is always
/// `path_for(n)`.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSequence {
    directory: PathBuf,
    format: FrameFormat,
    paths: Vec<PathBuf>,
}

impl FrameSequence {
    pub fn new(directory: &Path, format: FrameFormat) -> Self {
        Self {
            directory: directory.to_path_buf(),
            format,
            paths: Vec::new(),
        }
    }

    /// File name for the frame at `index`, e.g. `frame_0007.png`.
    pub fn file_name(index: usize, format: FrameFormat) -> String {
        format!(
            "{FRAME_FILE_PREFIX}{index:0width$}.{ext}",
            width = FRAME_INDEX_WIDTH,
            ext = format.extension()
        )
    }

    pub fn path_for(&self, index: usize) -> PathBuf {
        self.directory.join(Self::file_name(index, self.format))
    }

    /// Path the next pushed frame will occupy.
    pub fn next_path(&self) -> PathBuf {
        self.path_for(self.paths.len())
    }

    pub fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::first(0, FrameFormat::Png, "frame_0000.png")]
    #[case::padded(42, FrameFormat::Jpeg, "frame_0042.jpg")]
    #[case::four_digits(9999, FrameFormat::Png, "frame_9999.png")]
    #[case::grows_past_padding(12345, FrameFormat::Png, "frame_12345.png")]
    fn test_file_name(#[case] index: usize, #[case] format: FrameFormat, #[case] expected: &str) {
        assert_eq!(FrameSequence::file_name(index, format), expected);
    }

    #[test]
    fn test_next_path_follows_push_count() {
        let mut seq = FrameSequence::new(Path::new("/out"), FrameFormat::Png);
        assert_eq!(seq.next_path(), PathBuf::from("/out/frame_0000.png"));
        let first = seq.next_path();
        seq.push(first);
        assert_eq!(seq.next_path(), PathBuf::from("/out/frame_0001.png"));
        assert_eq!(seq.len(), 1);
        assert!(!seq.is_empty());
    }

    #[test]
    fn test_new_sequence_is_empty() {
        let seq = FrameSequence::new(Path::new("/out"), FrameFormat::Jpeg);
        assert!(seq.is_empty());
        assert!(seq.paths().is_empty());
        assert_eq!(seq.next_path(), PathBuf::from("/out/frame_0000.jpg"));
    }

    #[rstest]
    #[case("png", FrameFormat::Png)]
    #[case("PNG", FrameFormat::Png)]
    #[case("jpg", FrameFormat::Jpeg)]
    #[case("jpeg", FrameFormat::Jpeg)]
    fn test_frame_format_parse(#[case] input: &str, #[case] expected: FrameFormat) {
        assert_eq!(input.parse::<FrameFormat>().unwrap(), expected);
    }

    #[test]
    fn test_frame_format_parse_unknown() {
        assert!("gif".parse::<FrameFormat>().is_err());
    }

    #[test]
    fn test_default_format_is_png() {
        assert_eq!(FrameFormat::default(), FrameFormat::Png);
    }
}
