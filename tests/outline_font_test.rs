// Outline font tests
//
// Watermarks drawn with a real TrueType font must stay inside the box the
// placement engine measured, including glyph overhangs and italics.

use image::{DynamicImage, Rgba, RgbaImage};
use photomark::watermark::{
    apply_watermark, compute_position, margin_for, measure_text, Anchor, FontProvider,
    FontSource, ImageDimensions, ResolvedFonts, WatermarkSpec,
};
use rstest::rstest;

const SANS: &[u8] = include_bytes!("fixtures/DejaVuSans.ttf");
const OBLIQUE: &[u8] = include_bytes!("fixtures/DejaVuSans-Oblique.ttf");

fn outline_fonts(data: &[u8]) -> ResolvedFonts {
    let fonts = ResolvedFonts::resolve(&[FontSource::bytes("fixture", data.to_vec())]);
    assert!(!fonts.is_builtin(), "fixture font failed to load");
    fonts
}

#[rstest]
#[case(SANS, "TEST", Anchor::BottomRight)]
#[case(SANS, "jfj", Anchor::TopLeft)]
#[case(SANS, "Quality", Anchor::BottomLeft)]
#[case(SANS, "(gjy)", Anchor::BottomCenter)]
#[case(OBLIQUE, "Wf", Anchor::TopRight)]
#[case(OBLIQUE, "ffj", Anchor::Center)]
#[case(OBLIQUE, "gyp", Anchor::MiddleRight)]
#[case(OBLIQUE, "fly", Anchor::MiddleLeft)]
fn test_outline_ink_stays_inside_placed_box(
    #[case] font_data: &[u8],
    #[case] text: &str,
    #[case] anchor: Anchor,
) {
    let (width, height) = (600u32, 400u32);
    let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([255, 255, 255, 255]),
    ));
    let fonts = outline_fonts(font_data);
    let spec = WatermarkSpec::new(text)
        .with_font_size(80)
        .with_opacity(100)
        .with_anchor(anchor);

    let result = apply_watermark(&source, &spec, &fonts).to_rgba8();

    let font = fonts.font(80);
    let dims = measure_text(text, &font).expect("outline fonts measure precisely");
    let pos = compute_position(width, height, text, &font, anchor);
    let margin = margin_for(&ImageDimensions::new(width, height)) as i32;

    let mut changed = 0;
    for (x, y, pixel) in result.enumerate_pixels() {
        if pixel.0 == [255, 255, 255, 255] {
            continue;
        }
        changed += 1;
        let (x, y) = (x as i32, y as i32);
        assert!(
            x >= pos.x && x < pos.x + dims.width as i32 && y >= pos.y && y < pos.y + dims.height as i32,
            "{:?} at {}: pixel ({}, {}) outside box {:?} {:?}",
            text,
            anchor,
            x,
            y,
            pos,
            dims
        );
        // Ink never runs into the margin
        assert!(x >= margin && x < width as i32 - margin, "{:?}: x={} in margin", text, x);
        assert!(y >= margin && y < height as i32 - margin, "{:?}: y={} in margin", text, y);
    }
    assert!(changed > 0, "{:?} drew nothing", text);
}

#[test]
fn test_outline_bottom_right_hugs_margin() {
    let fonts = outline_fonts(SANS);
    let font = fonts.font(80);
    let dims = measure_text("TEST", &font).unwrap();

    // margin = max(10, 0.02 * 400) = 10
    let pos = compute_position(600, 400, "TEST", &font, Anchor::BottomRight);
    assert_eq!(pos.x + dims.width as i32, 590);
    assert_eq!(pos.y + dims.height as i32, 390);
}

#[test]
fn test_outline_opacity_zero_is_identity() {
    let source = DynamicImage::ImageRgba8(RgbaImage::from_fn(320, 200, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255])
    }));
    let spec = WatermarkSpec::new("Invisible").with_opacity(0);

    let result = apply_watermark(&source, &spec, &outline_fonts(OBLIQUE));
    assert_eq!(result.to_rgba8(), source.to_rgba8());
}
