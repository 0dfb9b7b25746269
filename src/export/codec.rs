//! Image loading and saving for export.
//!
//! PNG sources are written back as PNG with default compression; every other
//! source is flattened to RGB and written as JPEG at quality 95.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::io::Reader as ImageReader;
use image::{ColorType, DynamicImage, ImageEncoder as _};
use std::io::Cursor;
use std::path::Path;

use crate::error::ImageError;

/// JPEG quality used for every non-PNG output.
pub const JPEG_QUALITY: u8 = 95;

/// Encoded output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Output format for a source path: PNG stays PNG, everything else is JPEG.
    pub fn for_source(path: &Path) -> Self {
        let is_png = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("png"))
            .unwrap_or(false);
        if is_png {
            OutputFormat::Png
        } else {
            OutputFormat::Jpeg
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
        }
    }
}

/// Decode an image file, detecting the format from its contents.
pub fn load_image(path: &Path) -> Result<DynamicImage, ImageError> {
    ImageReader::open(path)
        .map_err(|e| ImageError::io(path, e))?
        .with_guessed_format()
        .map_err(|e| ImageError::io(path, e))?
        .decode()
        .map_err(|e| ImageError::decode_failed(path, e.to_string()))
}

/// Encode an image to bytes. `path` is only used for error messages.
pub fn encode_image(
    image: &DynamicImage,
    format: OutputFormat,
    path: &Path,
) -> Result<Vec<u8>, ImageError> {
    let mut output = Cursor::new(Vec::new());

    match format {
        OutputFormat::Png => {
            let rgba = image.to_rgba8();
            let encoder = PngEncoder::new_with_quality(
                &mut output,
                CompressionType::Default,
                FilterType::Adaptive,
            );
            encoder
                .write_image(rgba.as_raw(), rgba.width(), rgba.height(), ColorType::Rgba8)
                .map_err(|e| ImageError::encode_failed(path, format.as_str(), e.to_string()))?;
        }
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = image.to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY);
            encoder
                .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
                .map_err(|e| ImageError::encode_failed(path, format.as_str(), e.to_string()))?;
        }
    }

    Ok(output.into_inner())
}

/// Encode and write an image, overwriting any existing file.
pub fn save_image(image: &DynamicImage, path: &Path, format: OutputFormat) -> Result<(), ImageError> {
    let data = encode_image(image, format, path)?;
    std::fs::write(path, data).map_err(|e| ImageError::write_failed(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(16, 8, |x, y| {
            Rgba([(x * 10) as u8, (y * 20) as u8, 100, 200])
        }))
    }

    #[test]
    fn test_output_format_for_source() {
        assert_eq!(OutputFormat::for_source(Path::new("a.png")), OutputFormat::Png);
        assert_eq!(OutputFormat::for_source(Path::new("a.PNG")), OutputFormat::Png);
        assert_eq!(OutputFormat::for_source(Path::new("a.jpg")), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::for_source(Path::new("a.bmp")), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::for_source(Path::new("a.tiff")), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::for_source(Path::new("noext")), OutputFormat::Jpeg);
    }

    #[test]
    fn test_png_round_trip_keeps_alpha() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.png");

        save_image(&sample(), &path, OutputFormat::Png).unwrap();
        let loaded = load_image(&path).unwrap();

        assert_eq!(loaded.to_rgba8(), sample().to_rgba8());
    }

    #[test]
    fn test_jpeg_output_is_rgb() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jpg");

        save_image(&sample(), &path, OutputFormat::Jpeg).unwrap();
        let loaded = load_image(&path).unwrap();

        assert_eq!(loaded.color(), ColorType::Rgb8);
        assert_eq!((loaded.width(), loaded.height()), (16, 8));
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.png");
        std::fs::write(&path, b"stale contents").unwrap();

        save_image(&sample(), &path, OutputFormat::Png).unwrap();
        assert!(load_image(&path).is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_image(Path::new("/nonexistent/image.png")).unwrap_err();
        assert!(matches!(err, ImageError::Io { .. }));
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let err = load_image(&path).unwrap_err();
        assert!(matches!(err, ImageError::DecodeFailed { .. }));
    }

    #[test]
    fn test_save_into_missing_directory_is_write_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.jpg");

        let err = save_image(&sample(), &path, OutputFormat::Jpeg).unwrap_err();
        assert!(matches!(err, ImageError::WriteFailed { .. }));
    }
}
