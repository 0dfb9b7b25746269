//! Watermark module for placing and blending text watermarks onto images.
//!
//! # Features
//!
//! - **Nine anchors**: corners, edge midpoints and center
//! - **Adaptive margin**: at least 10px, otherwise 2% of the shorter side
//! - **Font fallback**: ordered candidate fonts, built-in bitmap font last
//! - **Measurement fallback**: approximate sizing when a font cannot measure
//! - **Alpha blending**: "over" compositing with untouched pixels preserved
//!
//! # Example
//!
//! ```ignore
//! use photomark::watermark::{apply_watermark, Anchor, ResolvedFonts, WatermarkSpec};
//!
//! let fonts = ResolvedFonts::resolve(&candidates);
//! let spec = WatermarkSpec::new("Copyright 2025")
//!     .with_font_size(48)
//!     .with_opacity(70)
//!     .with_anchor(Anchor::BottomRight);
//!
//! let watermarked = apply_watermark(&image, &spec, &fonts);
//! ```

pub mod compositor;
pub mod config;
pub mod error;
pub mod font;
pub mod position;
pub mod text_renderer;

// Re-export main types for convenience
pub use compositor::{
    apply_watermark, apply_watermark_with_font_size, composite_over, render_overlay,
};
pub use config::{Anchor, HorizontalAlign, VerticalAlign, WatermarkDefaults, WatermarkSpec};
pub use error::WatermarkError;
pub use font::{load_font, FontFace, FontProvider, FontSource, ResolvedFonts, WatermarkFont};
pub use position::{
    calculate_position, compute_position, margin_for, ImageDimensions, PlacementPosition,
};
pub use text_renderer::{
    approximate_dimensions, draw_text, measure_text, parse_hex_color, text_dimensions, Color,
    TextDimensions,
};
