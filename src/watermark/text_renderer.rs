//! Text watermark rendering.
//!
//! This module measures watermark text and rasterizes it onto a transparent
//! overlay that the compositor later blends onto the target image.
//!
//! # Features
//!
//! - Hex color parsing (#RGB and #RRGGBB formats)
//! - Precise measurement for outline fonts: the inked bounding box of the
//!   laid-out glyphs, which is also exactly where they are drawn
//! - Approximate measurement when precise measurement is unavailable
//! - Built-in 8x8 bitmap font scaled with nearest-neighbour sampling
//!
//! # Example
//!
//! ```ignore
//! use photomark::watermark::text_renderer::{draw_text, text_dimensions, parse_hex_color};
//!
//! let font = fonts.font(48);
//! let dims = text_dimensions("Copyright 2025", &font);
//! let mut overlay = RgbaImage::new(800, 600);
//! draw_text(&mut overlay, "Copyright 2025", &font, position, parse_hex_color("#FFF")?, 179);
//! ```

use super::font::{FontFace, WatermarkFont};
use super::position::PlacementPosition;
use super::WatermarkError;
use ab_glyph::{point, Font, FontArc, OutlinedGlyph, PxScale, Rect, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};

/// Width of one built-in glyph cell relative to the font size.
const APPROX_CHAR_WIDTH: f32 = 0.5;
/// Line height relative to the font size when measurement is unavailable.
const APPROX_LINE_HEIGHT: f32 = 1.2;
/// Glyph cell size of the built-in bitmap font.
const BITMAP_CELL: usize = 8;

/// RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// White color.
    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Black color.
    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// Format as `#RRGGBB`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Measured size of a line of text, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextDimensions {
    pub width: u32,
    pub height: u32,
}

/// Parse a hex color string into RGB components.
///
/// Supports both #RGB and #RRGGBB formats.
///
/// # Examples
///
/// ```ignore
/// let white = parse_hex_color("#FFF").unwrap();
/// assert_eq!(white, Color::new(255, 255, 255));
///
/// let red = parse_hex_color("#FF0000").unwrap();
/// assert_eq!(red, Color::new(255, 0, 0));
/// ```
pub fn parse_hex_color(hex: &str) -> Result<Color, WatermarkError> {
    let invalid = || WatermarkError::InvalidColor(hex.to_string());

    let digits = hex.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let component = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

    match digits.len() {
        3 => {
            // #RGB format - each digit is doubled: 0xF -> 0xFF
            let r = component(&digits[0..1])?;
            let g = component(&digits[1..2])?;
            let b = component(&digits[2..3])?;
            Ok(Color::new(r * 17, g * 17, b * 17))
        }
        6 => Ok(Color::new(
            component(&digits[0..2])?,
            component(&digits[2..4])?,
            component(&digits[4..6])?,
        )),
        _ => Err(invalid()),
    }
}

/// Measure text precisely, if the font supports it.
///
/// The result is the inked bounding box of the laid-out glyphs, so overhangs
/// (`j`, `f`, italics) are included. Returns `None` for the built-in bitmap
/// font and for text with no visible glyphs.
pub fn measure_text(text: &str, font: &WatermarkFont) -> Option<TextDimensions> {
    let FontFace::Outline(outline) = font.face() else {
        return None;
    };

    let glyphs = layout_outline(outline, font.size(), text);
    let bounds = ink_bounds(&glyphs)?;

    let dims = TextDimensions {
        width: (bounds.max.x - bounds.min.x).round() as u32,
        height: (bounds.max.y - bounds.min.y).round() as u32,
    };
    if dims.width == 0 || dims.height == 0 {
        return None;
    }
    Some(dims)
}

/// Lay out one line of glyph outlines with the pen starting at `(0, ascent)`.
fn layout_outline(font: &FontArc, size: u32, text: &str) -> Vec<OutlinedGlyph> {
    let scale = PxScale::from(size as f32);
    let scaled_font = font.as_scaled(scale);

    let mut cursor_x = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;
    let mut outlines = Vec::new();

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);
        if let Some(prev) = prev_glyph {
            cursor_x += scaled_font.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(scale, point(cursor_x, scaled_font.ascent()));
        if let Some(outlined) = font.outline_glyph(glyph) {
            outlines.push(outlined);
        }

        cursor_x += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    outlines
}

/// Union of the whole-pixel bounds of every glyph.
fn ink_bounds(glyphs: &[OutlinedGlyph]) -> Option<Rect> {
    glyphs.iter().map(|g| g.px_bounds()).reduce(|acc, b| Rect {
        min: point(acc.min.x.min(b.min.x), acc.min.y.min(b.min.y)),
        max: point(acc.max.x.max(b.max.x), acc.max.y.max(b.max.y)),
    })
}

/// Approximate text size: `len * size * 0.5` by `size * 1.2`.
pub fn approximate_dimensions(text: &str, font_size: u32) -> TextDimensions {
    let chars = text.chars().count() as f32;
    let size = font_size as f32;
    TextDimensions {
        width: (chars * size * APPROX_CHAR_WIDTH).ceil() as u32,
        height: (size * APPROX_LINE_HEIGHT).ceil() as u32,
    }
}

/// Text size used for placement: precise when possible, approximate otherwise.
pub fn text_dimensions(text: &str, font: &WatermarkFont) -> TextDimensions {
    measure_text(text, font).unwrap_or_else(|| approximate_dimensions(text, font.size()))
}

/// Rasterize `text` onto `overlay` with its top-left corner at `position`.
///
/// Each covered pixel gets `color` with alpha `coverage * alpha`. Where glyphs
/// overlap the larger alpha wins. Anything outside the overlay is clipped.
pub fn draw_text(
    overlay: &mut RgbaImage,
    text: &str,
    font: &WatermarkFont,
    position: PlacementPosition,
    color: Color,
    alpha: u8,
) {
    if text.is_empty() || alpha == 0 {
        return;
    }

    let mut plot = |x: i32, y: i32, coverage: f32| {
        if x < 0 || y < 0 || x >= overlay.width() as i32 || y >= overlay.height() as i32 {
            return;
        }
        let pixel_alpha = (coverage.clamp(0.0, 1.0) * alpha as f32).round() as u8;
        if pixel_alpha == 0 {
            return;
        }
        let existing = overlay.get_pixel(x as u32, y as u32)[3];
        if pixel_alpha > existing {
            overlay.put_pixel(
                x as u32,
                y as u32,
                Rgba([color.r, color.g, color.b, pixel_alpha]),
            );
        }
    };

    match font.face() {
        FontFace::Outline(outline) => draw_outline(outline, font.size(), text, position, &mut plot),
        FontFace::Builtin => draw_bitmap(font.size(), text, position, &mut plot),
    }
}

/// Draw outline glyphs so their inked box starts exactly at `position`.
fn draw_outline(
    font: &FontArc,
    size: u32,
    text: &str,
    position: PlacementPosition,
    plot: &mut impl FnMut(i32, i32, f32),
) {
    let glyphs = layout_outline(font, size, text);
    let Some(ink) = ink_bounds(&glyphs) else {
        return;
    };

    for outlined in &glyphs {
        // px_bounds are whole pixels, so these offsets are exact
        let bounds = outlined.px_bounds();
        let left = position.x + (bounds.min.x - ink.min.x).round() as i32;
        let top = position.y + (bounds.min.y - ink.min.y).round() as i32;

        outlined.draw(|px, py, coverage| {
            plot(left + px as i32, top + py as i32, coverage);
        });
    }
}

/// Draw with the built-in font.
///
/// Every character occupies a square cell `size * 0.5` wide, vertically
/// centred in the `size * 1.2` approximate line box, so the drawn pixels stay
/// inside the box reported by [`approximate_dimensions`].
fn draw_bitmap(
    size: u32,
    text: &str,
    position: PlacementPosition,
    plot: &mut impl FnMut(i32, i32, f32),
) {
    let cell = size as f32 * APPROX_CHAR_WIDTH;
    let cell_px = cell.ceil() as i32;
    let top = position.y + ((size as f32 * APPROX_LINE_HEIGHT - cell) / 2.0).floor() as i32;

    for (idx, ch) in text.chars().enumerate() {
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; BITMAP_CELL]);
        let left = position.x + (idx as f32 * cell).floor() as i32;

        for py in 0..cell_px {
            let row = ((py as f32 * BITMAP_CELL as f32 / cell) as usize).min(BITMAP_CELL - 1);
            let bits = glyph[row];
            if bits == 0 {
                continue;
            }
            for px in 0..cell_px {
                let col = ((px as f32 * BITMAP_CELL as f32 / cell) as usize).min(BITMAP_CELL - 1);
                if (bits >> col) & 1 == 1 {
                    plot(left + px, top + py, 1.0);
                }
            }
        }
    }
}
