//! Watermark configuration types.
//!
//! This module defines:
//! - The nine named anchors a watermark can be placed at
//! - `WatermarkSpec`, the immutable description of one watermarking operation
//! - `WatermarkDefaults`, the serde-facing defaults loaded with the app config
//!
//! `WatermarkSpec` is a snapshot. Every setter consumes the value and returns a
//! new one, so the caller decides when a change should trigger a re-render.

use super::text_renderer::{parse_hex_color, Color};
use super::WatermarkError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Default values
fn default_text() -> String {
    "Watermark".to_string()
}

fn default_font_size() -> u32 {
    48
}

fn default_color() -> String {
    "#FF0000".to_string()
}

fn default_opacity() -> u8 {
    70
}

/// Watermark anchor on the image.
///
/// Nine fixed positions: the corners, the edge midpoints and the center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    Center,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

/// Horizontal component of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

/// Vertical component of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

impl Anchor {
    /// All anchors in reading order (top row first).
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::MiddleLeft,
        Anchor::Center,
        Anchor::MiddleRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::MiddleLeft => "middle-left",
            Self::Center => "center",
            Self::MiddleRight => "middle-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }

    pub fn horizontal(&self) -> HorizontalAlign {
        match self {
            Self::TopLeft | Self::MiddleLeft | Self::BottomLeft => HorizontalAlign::Left,
            Self::TopCenter | Self::Center | Self::BottomCenter => HorizontalAlign::Center,
            Self::TopRight | Self::MiddleRight | Self::BottomRight => HorizontalAlign::Right,
        }
    }

    pub fn vertical(&self) -> VerticalAlign {
        match self {
            Self::TopLeft | Self::TopCenter | Self::TopRight => VerticalAlign::Top,
            Self::MiddleLeft | Self::Center | Self::MiddleRight => VerticalAlign::Middle,
            Self::BottomLeft | Self::BottomCenter | Self::BottomRight => VerticalAlign::Bottom,
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Anchor {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Anchor::ALL
            .into_iter()
            .find(|anchor| anchor.as_str() == needle)
            .ok_or_else(|| WatermarkError::UnknownAnchor(s.to_string()))
    }
}

/// Full description of one watermarking operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkSpec {
    /// Text to draw (single line)
    pub text: String,
    /// Font size in pixels at export resolution
    pub font_size: u32,
    /// Fill color
    pub color: Color,
    /// Opacity from 0 (invisible) to 100 (opaque)
    pub opacity: u8,
    /// Where the text is anchored
    pub anchor: Anchor,
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self {
            text: default_text(),
            font_size: default_font_size(),
            color: Color::new(255, 0, 0),
            opacity: default_opacity(),
            anchor: Anchor::default(),
        }
    }
}

impl WatermarkSpec {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Alpha channel value for the text: `round(255 * opacity / 100)`.
    pub fn alpha(&self) -> u8 {
        (255.0 * f32::from(self.opacity.min(100)) / 100.0).round() as u8
    }

    /// Validate the spec.
    ///
    /// Empty text is not an error here: the compositor treats it as a no-op.
    /// Export rejects it separately before processing starts.
    pub fn validate(&self) -> Result<(), WatermarkError> {
        if self.font_size == 0 {
            return Err(WatermarkError::InvalidFontSize(self.font_size));
        }
        if self.opacity > 100 {
            return Err(WatermarkError::InvalidOpacity(self.opacity));
        }
        Ok(())
    }
}

/// Serializable watermark defaults.
///
/// ```yaml
/// watermark:
///   text: "Copyright"
///   font_size: 48
///   color: "#FF0000"
///   opacity: 70
///   anchor: bottom-right
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkDefaults {
    /// Text content (default: "Watermark")
    #[serde(default = "default_text")]
    pub text: String,

    /// Font size in pixels (default: 48)
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Text color as hex string (default: "#FF0000")
    #[serde(default = "default_color")]
    pub color: String,

    /// Opacity from 0 to 100 (default: 70)
    #[serde(default = "default_opacity")]
    pub opacity: u8,

    /// Anchor position (default: bottom-right)
    #[serde(default)]
    pub anchor: Anchor,
}

impl Default for WatermarkDefaults {
    fn default() -> Self {
        Self {
            text: default_text(),
            font_size: default_font_size(),
            color: default_color(),
            opacity: default_opacity(),
            anchor: Anchor::default(),
        }
    }
}

impl WatermarkDefaults {
    /// Build a validated spec from these defaults.
    pub fn to_spec(&self) -> Result<WatermarkSpec, WatermarkError> {
        let spec = WatermarkSpec {
            text: self.text.clone(),
            font_size: self.font_size,
            color: parse_hex_color(&self.color)?,
            opacity: self.opacity,
            anchor: self.anchor,
        };
        spec.validate()?;
        Ok(spec)
    }
}
