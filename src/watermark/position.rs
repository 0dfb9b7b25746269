//! Position calculation for watermark placement.
//!
//! This module computes where watermark text should be drawn on an image for
//! each of the nine named anchors.
//!
//! # Rules
//!
//! - Margin is `max(10, 2% of the shorter image side)`.
//! - Left/top anchors sit at the margin, right/bottom anchors sit a margin away
//!   from the far edge, center/middle anchors split the free space evenly.
//! - No clamping: text larger than the image yields negative coordinates and
//!   the compositor clips whatever falls outside.
//!
//! # Example
//!
//! ```ignore
//! use photomark::watermark::position::{calculate_position, ImageDimensions};
//! use photomark::watermark::{Anchor, TextDimensions};
//!
//! let image = ImageDimensions { width: 1000, height: 800 };
//! let text = TextDimensions { width: 120, height: 40 };
//! let margin = margin_for(&image); // 16.0
//!
//! let pos = calculate_position(Anchor::BottomRight, &image, &text, margin);
//! assert_eq!((pos.x, pos.y), (864, 744));
//! ```

use super::config::{Anchor, HorizontalAlign, VerticalAlign};
use super::font::WatermarkFont;
use super::text_renderer::{text_dimensions, TextDimensions};

/// Smallest margin in pixels.
pub const MIN_MARGIN: f64 = 10.0;
/// Margin as a fraction of the shorter image side.
pub const MARGIN_RATIO: f64 = 0.02;

/// Dimensions of the target image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Top-left pixel where the watermark text box starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Margin for an image: at least 10px, otherwise 2% of the shorter side.
pub fn margin_for(image: &ImageDimensions) -> f64 {
    let shorter = image.width.min(image.height) as f64;
    (shorter * MARGIN_RATIO).max(MIN_MARGIN)
}

/// Calculate the position of a text box for an anchor.
///
/// Coordinates are floored to whole pixels and may be negative if the text
/// is larger than the image.
pub fn calculate_position(
    anchor: Anchor,
    image: &ImageDimensions,
    text: &TextDimensions,
    margin: f64,
) -> PlacementPosition {
    let free_w = image.width as f64 - text.width as f64;
    let free_h = image.height as f64 - text.height as f64;

    let x = match anchor.horizontal() {
        HorizontalAlign::Left => margin,
        HorizontalAlign::Center => free_w / 2.0,
        HorizontalAlign::Right => free_w - margin,
    };
    let y = match anchor.vertical() {
        VerticalAlign::Top => margin,
        VerticalAlign::Middle => free_h / 2.0,
        VerticalAlign::Bottom => free_h - margin,
    };

    PlacementPosition::new(x.floor() as i32, y.floor() as i32)
}

/// Measure `text` under `font` and place it on an image of the given size.
pub fn compute_position(
    image_width: u32,
    image_height: u32,
    text: &str,
    font: &WatermarkFont,
    anchor: Anchor,
) -> PlacementPosition {
    let image = ImageDimensions::new(image_width, image_height);
    let dims = text_dimensions(text, font);
    calculate_position(anchor, &image, &dims, margin_for(&image))
}
