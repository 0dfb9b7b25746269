//! Font resolution for text watermarks.
//!
//! Fonts are resolved once at startup from an ordered list of candidate
//! sources. The first source that parses wins; if none does, the built-in
//! 8x8 bitmap font is used so rendering never fails for lack of a font.
//!
//! The compositor only ever sees the [`FontProvider`] capability and never
//! touches the filesystem itself.
//!
//! # Example
//!
//! ```ignore
//! use photomark::watermark::font::{FontProvider, FontSource, ResolvedFonts};
//!
//! let fonts = ResolvedFonts::resolve(&[
//!     FontSource::path("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
//!     FontSource::path("/System/Library/Fonts/Helvetica.ttc"),
//! ]);
//! let font = fonts.font(48);
//! ```

use super::WatermarkError;
use ab_glyph::{FontArc, FontVec};
use std::fmt;
use std::path::PathBuf;

/// A candidate location for font data.
#[derive(Debug, Clone)]
pub enum FontSource {
    /// TrueType/OpenType file or collection on disk
    Path(PathBuf),
    /// Font data already in memory
    Bytes { name: String, data: Vec<u8> },
}

impl FontSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self::Bytes {
            name: name.into(),
            data,
        }
    }

    /// Human-readable name used in logs and errors.
    pub fn name(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes { name, .. } => name.clone(),
        }
    }
}

/// Load a single font source.
///
/// Collections (`.ttc`) are read at face index 0, which is also the only valid
/// index for plain font files.
pub fn load_font(source: &FontSource) -> Result<FontArc, WatermarkError> {
    let data = match source {
        FontSource::Path(path) => std::fs::read(path).map_err(|e| WatermarkError::FontLoad {
            source_name: source.name(),
            message: e.to_string(),
        })?,
        FontSource::Bytes { data, .. } => data.clone(),
    };

    let font = FontVec::try_from_vec_and_index(data, 0).map_err(|e| WatermarkError::FontLoad {
        source_name: source.name(),
        message: e.to_string(),
    })?;

    Ok(FontArc::new(font))
}

/// The typeface used to draw watermark text.
#[derive(Clone)]
pub enum FontFace {
    /// A parsed outline font
    Outline(FontArc),
    /// The embedded 8x8 bitmap font
    Builtin,
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outline(_) => f.write_str("Outline"),
            Self::Builtin => f.write_str("Builtin"),
        }
    }
}

/// A typeface at a concrete pixel size.
#[derive(Debug, Clone)]
pub struct WatermarkFont {
    face: FontFace,
    size: u32,
}

impl WatermarkFont {
    /// Sizes below one pixel are raised to one.
    pub fn new(face: FontFace, size: u32) -> Self {
        Self {
            face,
            size: size.max(1),
        }
    }

    pub fn builtin(size: u32) -> Self {
        Self::new(FontFace::Builtin, size)
    }

    pub fn face(&self) -> &FontFace {
        &self.face
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.face, FontFace::Builtin)
    }
}

/// Capability that hands out fonts at a requested size.
pub trait FontProvider {
    fn font(&self, size: u32) -> WatermarkFont;
}

/// Fonts resolved from a candidate list.
#[derive(Debug, Clone)]
pub struct ResolvedFonts {
    face: FontFace,
    source_name: Option<String>,
}

impl ResolvedFonts {
    /// Try each source in order and keep the first that loads.
    pub fn resolve(sources: &[FontSource]) -> Self {
        for source in sources {
            match load_font(source) {
                Ok(font) => {
                    tracing::info!(font = %source.name(), "Using watermark font");
                    return Self {
                        face: FontFace::Outline(font),
                        source_name: Some(source.name()),
                    };
                }
                Err(e) => {
                    tracing::debug!(font = %source.name(), error = %e, "Font candidate rejected");
                }
            }
        }

        tracing::warn!(
            candidates = sources.len(),
            "No font candidate could be loaded, using built-in bitmap font"
        );
        Self::builtin()
    }

    /// Provider that always uses the built-in bitmap font.
    pub fn builtin() -> Self {
        Self {
            face: FontFace::Builtin,
            source_name: None,
        }
    }

    /// Name of the source that was selected, `None` for the built-in font.
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.face, FontFace::Builtin)
    }
}

impl FontProvider for ResolvedFonts {
    fn font(&self, size: u32) -> WatermarkFont {
        WatermarkFont::new(self.face.clone(), size)
    }
}
