// Error types module

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::export::ExportError;
use crate::watermark::WatermarkError;

/// Errors that can occur while loading, resizing or saving a single image.
///
/// These never abort a batch: the exporter counts them as failures and moves
/// on to the next image.
#[derive(Debug, Error)]
pub enum ImageError {
    /// File could not be opened or read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File was read but is not a decodable image
    #[error("Failed to decode {}: {message}", path.display())]
    DecodeFailed { path: PathBuf, message: String },

    /// Preview resize failed
    #[error("Resize failed: {message}")]
    ResizeFailed { message: String },

    /// Encoding to the output format failed
    #[error("Failed to encode {format} for {}: {message}", path.display())]
    EncodeFailed {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// Output file could not be created or written
    #[error("Failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ImageError {
    /// Helper constructors for common error patterns
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        ImageError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn decode_failed(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        ImageError::DecodeFailed {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    pub fn resize_failed(message: impl Into<String>) -> Self {
        ImageError::ResizeFailed {
            message: message.into(),
        }
    }

    pub fn encode_failed(
        path: impl AsRef<Path>,
        format: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ImageError::EncodeFailed {
            path: path.as_ref().to_path_buf(),
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn write_failed(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        ImageError::WriteFailed {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// True for errors raised while reading the source image.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, ImageError::Io { .. } | ImageError::DecodeFailed { .. })
    }
}

/// Top-level error for library callers that want a single error type.
#[derive(Debug, Error)]
pub enum PhotomarkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Watermark(#[from] WatermarkError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Export(#[from] ExportError),

    /// Preview requested with nothing selected
    #[error("No image selected for preview")]
    NoImageSelected,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_image_error_display() {
        let err = ImageError::decode_failed("/photos/a.jpg", "invalid JPEG marker");
        assert_eq!(
            err.to_string(),
            "Failed to decode /photos/a.jpg: invalid JPEG marker"
        );

        let err = ImageError::encode_failed("/out/a.png", "png", "buffer too small");
        assert_eq!(
            err.to_string(),
            "Failed to encode png for /out/a.png: buffer too small"
        );

        let err = ImageError::resize_failed("Target width is 0");
        assert_eq!(err.to_string(), "Resize failed: Target width is 0");
    }

    #[test]
    fn test_io_errors_keep_source() {
        use std::error::Error as _;

        let err = ImageError::write_failed(
            "/readonly/out.jpg",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().starts_with("Failed to write /readonly/out.jpg"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_load_failure_classification() {
        assert!(ImageError::decode_failed("a", "x").is_load_failure());
        assert!(ImageError::io("a", io::Error::new(io::ErrorKind::NotFound, "x")).is_load_failure());
        assert!(!ImageError::write_failed("a", io::Error::new(io::ErrorKind::Other, "x"))
            .is_load_failure());
        assert!(!ImageError::encode_failed("a", "jpeg", "x").is_load_failure());
    }

    #[test]
    fn test_photomark_error_from_conversions() {
        let err: PhotomarkError = WatermarkError::InvalidOpacity(200).into();
        assert!(matches!(err, PhotomarkError::Watermark(_)));
        assert_eq!(
            err.to_string(),
            "Watermark opacity must be between 0 and 100, got 200"
        );

        let err: PhotomarkError = ExportError::NoImagesSelected.into();
        assert!(matches!(err, PhotomarkError::Export(_)));
    }
}
