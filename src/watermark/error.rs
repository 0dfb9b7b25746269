//! Watermark error types.
//!
//! Defines errors that can occur while building or validating a watermark.
//! Rendering itself never fails: missing fonts and unmeasurable text degrade
//! to the built-in font and approximate sizing instead.

use thiserror::Error;

/// Errors that can occur during watermark processing.
#[derive(Debug, Error)]
pub enum WatermarkError {
    /// Font size must be a positive integer
    #[error("Watermark font size must be positive, got {0}")]
    InvalidFontSize(u32),

    /// Opacity outside 0-100
    #[error("Watermark opacity must be between 0 and 100, got {0}")]
    InvalidOpacity(u8),

    /// Color string could not be parsed
    #[error("Invalid watermark color: {0}")]
    InvalidColor(String),

    /// Anchor name is not one of the nine known positions
    #[error("Unknown watermark anchor '{0}'")]
    UnknownAnchor(String),

    /// A font source could not be read or parsed
    #[error("Failed to load font from {source_name}: {message}")]
    FontLoad {
        source_name: String,
        message: String,
    },
}
