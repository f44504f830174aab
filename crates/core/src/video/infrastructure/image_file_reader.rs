use std::path::Path;

use crate::shared::frame::Frame;
use crate::video::domain::image_reader::ImageReader;

/// Decodes image files with the `image` crate, converting to RGB8.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path, index: usize) -> Result<Frame, Box<dyn std::error::Error>> {
        let img = image::open(path)?.to_rgb8();
        let (width, height) = img.dimensions();
        Ok(Frame::new(img.into_raw(), width, height, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_test_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let mut img = image::RgbImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgb([50, 100, 200]);
        }
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_read_returns_rgb_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), "frame_0000.png", 100, 80);

        let frame = ImageFileReader::new().read(&path, 3).unwrap();
        assert_eq!(frame.dimensions(), (100, 80));
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 3);
        assert_eq!(&frame.data()[..3], &[50, 100, 200]);
    }

    #[test]
    fn test_read_converts_grayscale_to_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        image::GrayImage::from_pixel(8, 8, image::Luma([77])).save(&path).unwrap();

        let frame = ImageFileReader::new().read(&path, 0).unwrap();
        assert_eq!(frame.data().len(), 8 * 8 * 3);
        assert!(frame.data().iter().all(|&v| v == 77));
    }

    #[test]
    fn test_read_missing_file_returns_error() {
        let result = ImageFileReader::new().read(Path::new("/nonexistent/frame_0000.png"), 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_read_corrupt_file_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame_0000.png");
        std::fs::write(&path, b"not a png").unwrap();
        assert!(ImageFileReader::new().read(&path, 0).is_err());
    }
}
