//! Watermark compositor for blending text onto images.
//!
//! The text is first rendered onto a transparent overlay the size of the
//! target, then the overlay is blended over the target with the Porter-Duff
//! "over" operator. Pixels the overlay does not cover are copied unchanged.
//!
//! # Example
//!
//! ```ignore
//! use photomark::watermark::{apply_watermark, ResolvedFonts, WatermarkSpec};
//!
//! let fonts = ResolvedFonts::builtin();
//! let spec = WatermarkSpec::new("Copyright 2025").with_opacity(50);
//! let watermarked = apply_watermark(&image, &spec, &fonts);
//! ```

use super::config::WatermarkSpec;
use super::font::FontProvider;
use super::position::compute_position;
use super::text_renderer::draw_text;
use image::{DynamicImage, Rgba, RgbaImage};

/// Apply a text watermark at the spec's export font size.
///
/// Returns a new image; the input is left untouched. Empty text returns an
/// unchanged copy of the source in its original pixel format.
pub fn apply_watermark(
    image: &DynamicImage,
    spec: &WatermarkSpec,
    fonts: &impl FontProvider,
) -> DynamicImage {
    apply_watermark_with_font_size(image, spec, fonts, spec.font_size)
}

/// Apply a text watermark with an explicit font size.
///
/// Used by the preview, which draws on a downscaled image with a font size
/// scaled by the same ratio.
pub fn apply_watermark_with_font_size(
    image: &DynamicImage,
    spec: &WatermarkSpec,
    fonts: &impl FontProvider,
    font_size: u32,
) -> DynamicImage {
    if spec.text.is_empty() {
        return image.clone();
    }

    let mut canvas = image.to_rgba8();
    let overlay = render_overlay(&canvas, spec, fonts, font_size);
    composite_over(&mut canvas, &overlay);
    DynamicImage::ImageRgba8(canvas)
}

/// Render the watermark text onto a transparent overlay matching `target`.
pub fn render_overlay(
    target: &RgbaImage,
    spec: &WatermarkSpec,
    fonts: &impl FontProvider,
    font_size: u32,
) -> RgbaImage {
    let (width, height) = target.dimensions();
    let mut overlay = RgbaImage::new(width, height);

    let font = fonts.font(font_size);
    let position = compute_position(width, height, &spec.text, &font, spec.anchor);

    draw_text(
        &mut overlay,
        &spec.text,
        &font,
        position,
        spec.color,
        spec.alpha(),
    );

    overlay
}

/// Blend `overlay` over `target` in place.
///
/// Both images must have the same dimensions; any excess is ignored.
pub fn composite_over(target: &mut RgbaImage, overlay: &RgbaImage) {
    let width = target.width().min(overlay.width());
    let height = target.height().min(overlay.height());

    for y in 0..height {
        for x in 0..width {
            let fg = overlay.get_pixel(x, y);
            if fg[3] == 0 {
                continue;
            }
            let bg = target.get_pixel(x, y);
            let blended = blend_pixels(*bg, *fg);
            target.put_pixel(x, y, blended);
        }
    }
}

/// Blend two pixels using the "over" operator.
///
/// result = foreground + background * (1 - foreground.alpha)
fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = foreground[3] as f32 / 255.0;
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watermark::font::ResolvedFonts;
    use crate::watermark::position::{margin_for, ImageDimensions};
    use crate::watermark::text_renderer::{approximate_dimensions, Color};
    use crate::watermark::Anchor;

    fn solid(width: u32, height: u32, pixel: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(width, height, pixel)
    }

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        }))
    }

    #[test]
    fn test_blend_pixels_opaque_foreground() {
        let result = blend_pixels(Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 255]));
        assert_eq!(result, Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_blend_pixels_half_alpha() {
        let result = blend_pixels(Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 128]));
        // 255 * 128/255 = 128
        assert_eq!(result, Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn test_blend_pixels_transparent_background() {
        let result = blend_pixels(Rgba([50, 60, 70, 0]), Rgba([200, 100, 0, 128]));
        assert_eq!(result, Rgba([200, 100, 0, 128]));
    }

    #[test]
    fn test_composite_over_skips_transparent_overlay() {
        let mut target = solid(4, 4, Rgba([10, 20, 30, 40]));
        let mut overlay = RgbaImage::new(4, 4);
        overlay.put_pixel(1, 1, Rgba([255, 0, 0, 255]));

        composite_over(&mut target, &overlay);

        assert_eq!(*target.get_pixel(1, 1), Rgba([255, 0, 0, 255]));
        assert_eq!(*target.get_pixel(0, 0), Rgba([10, 20, 30, 40]));
        assert_eq!(*target.get_pixel(3, 3), Rgba([10, 20, 30, 40]));
    }

    #[test]
    fn test_apply_preserves_dimensions() {
        let source = gradient(321, 123);
        let spec = WatermarkSpec::new("Sample").with_font_size(24);
        let result = apply_watermark(&source, &spec, &ResolvedFonts::builtin());
        assert_eq!((result.width(), result.height()), (321, 123));
    }

    #[test]
    fn test_apply_changes_pixels_inside_text_box() {
        let source = DynamicImage::ImageRgba8(solid(400, 300, Rgba([0, 0, 0, 255])));
        let spec = WatermarkSpec::new("MARK")
            .with_font_size(40)
            .with_color(Color::white())
            .with_opacity(100)
            .with_anchor(Anchor::Center);

        let result = apply_watermark(&source, &spec, &ResolvedFonts::builtin()).to_rgba8();
        let white = result.pixels().filter(|p| **p == Rgba([255, 255, 255, 255])).count();
        assert!(white > 0, "Expected opaque white glyph pixels");
    }

    #[test]
    fn test_opacity_zero_is_identity() {
        let source = gradient(200, 150);
        let spec = WatermarkSpec::new("INVISIBLE").with_opacity(0);

        let result = apply_watermark(&source, &spec, &ResolvedFonts::builtin());
        assert_eq!(result.to_rgba8(), source.to_rgba8());
    }

    #[test]
    fn test_empty_text_returns_source_unchanged() {
        let source = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            64,
            32,
            image::Rgb([1, 2, 3]),
        ));
        let spec = WatermarkSpec::new("");

        let result = apply_watermark(&source, &spec, &ResolvedFonts::builtin());
        assert_eq!(result, source);
    }

    #[test]
    fn test_pixels_outside_text_box_unchanged() {
        let source = gradient(640, 480);
        let spec = WatermarkSpec::new("PROOF")
            .with_font_size(36)
            .with_opacity(80)
            .with_anchor(Anchor::BottomRight);
        let fonts = ResolvedFonts::builtin();

        let result = apply_watermark(&source, &spec, &fonts).to_rgba8();
        let original = source.to_rgba8();

        let dims = approximate_dimensions("PROOF", 36);
        let img = ImageDimensions::new(640, 480);
        let pos = crate::watermark::position::calculate_position(
            Anchor::BottomRight,
            &img,
            &dims,
            margin_for(&img),
        );

        let mut changed_inside = 0;
        for (x, y, pixel) in result.enumerate_pixels() {
            let inside = (x as i32) >= pos.x
                && (x as i32) < pos.x + dims.width as i32
                && (y as i32) >= pos.y
                && (y as i32) < pos.y + dims.height as i32;
            if inside {
                if pixel != original.get_pixel(x, y) {
                    changed_inside += 1;
                }
            } else {
                assert_eq!(pixel, original.get_pixel(x, y), "Pixel ({}, {}) changed", x, y);
            }
        }
        assert!(changed_inside > 0);
    }

    #[test]
    fn test_input_not_mutated() {
        let source = gradient(100, 100);
        let snapshot = source.clone();
        let _ = apply_watermark(
            &source,
            &WatermarkSpec::new("X").with_opacity(100),
            &ResolvedFonts::builtin(),
        );
        assert_eq!(source, snapshot);
    }

    #[test]
    fn test_oversized_text_is_clipped() {
        let source = gradient(40, 20);
        let spec = WatermarkSpec::new("FAR TOO LONG FOR THIS IMAGE")
            .with_font_size(120)
            .with_anchor(Anchor::TopLeft);
        let result = apply_watermark(&source, &spec, &ResolvedFonts::builtin());
        assert_eq!((result.width(), result.height()), (40, 20));
    }
}
