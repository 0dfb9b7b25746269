//! Preview session state.
//!
//! A `PreviewSession` is owned by the UI collaborator and passed into every
//! preview call. It tracks the image list, the selected image, the container
//! size and the scale of the selected image. Nothing here is global.

use fast_image_resize::{FilterType, Image, PixelType, ResizeAlg, Resizer};
use image::{DynamicImage, RgbaImage};
use std::collections::HashSet;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use super::scale::ScaleState;
use crate::error::{ImageError, PhotomarkError};
use crate::export::codec::load_image;
use crate::export::is_supported_image;
use crate::watermark::{apply_watermark_with_font_size, FontProvider, WatermarkSpec};

/// A rendered preview ready for display.
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    /// Scaled, watermarked bitmap
    pub image: RgbaImage,
    /// Where to draw `image` so it is centred in the container
    pub offset: (i32, i32),
    /// Scale state used for this frame
    pub scale: ScaleState,
    /// Font size the watermark was drawn with
    pub font_size: u32,
}

/// Image list, selection and scale for the interactive preview.
#[derive(Debug, Clone)]
pub struct PreviewSession {
    images: Vec<PathBuf>,
    current: Option<usize>,
    container: (u32, u32),
    scale: Option<ScaleState>,
}

impl PreviewSession {
    pub fn new(container: (u32, u32)) -> Self {
        Self {
            images: Vec::new(),
            current: None,
            container,
            scale: None,
        }
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.map(|idx| self.images[idx].as_path())
    }

    pub fn container(&self) -> (u32, u32) {
        self.container
    }

    /// Scale of the selected image. `None` until the image has been rendered
    /// once, since its dimensions are unknown before loading.
    pub fn scale(&self) -> Option<ScaleState> {
        self.scale
    }

    /// Append supported images that are not already in the list.
    ///
    /// Selects the first image whenever something was added. Returns how many
    /// paths were added.
    pub fn add_images<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut known: HashSet<PathBuf> = self.images.iter().cloned().collect();
        let before = self.images.len();

        for path in paths {
            let path = path.into();
            if is_supported_image(&path) && known.insert(path.clone()) {
                self.images.push(path);
            }
        }

        let added = self.images.len() - before;
        if added > 0 {
            self.select(0);
        }
        added
    }

    /// Remove images by index. Out-of-range indices are ignored.
    ///
    /// The selection moves to the first remaining image, or is cleared when
    /// the list becomes empty.
    pub fn remove_images(&mut self, indices: &[usize]) -> usize {
        let mut sorted: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|idx| *idx < self.images.len())
            .collect();
        sorted.sort_unstable();
        sorted.dedup();

        for idx in sorted.iter().rev() {
            self.images.remove(*idx);
        }

        if self.images.is_empty() {
            self.current = None;
            self.scale = None;
        } else {
            self.select(0);
        }
        sorted.len()
    }

    /// Select an image by index. Resets the scale to fit on the next render.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.images.len() {
            return false;
        }
        self.current = Some(index);
        self.scale = None;
        true
    }

    /// Container was resized. Any manual zoom is discarded.
    pub fn resize_container(&mut self, width: u32, height: u32) -> Option<ScaleState> {
        self.container = (width, height);
        self.scale = self.scale.map(|s| s.resize(self.container));
        self.scale
    }

    pub fn zoom_in(&mut self) -> Option<ScaleState> {
        self.scale = self.scale.map(ScaleState::zoom_in);
        self.scale
    }

    pub fn zoom_out(&mut self) -> Option<ScaleState> {
        self.scale = self.scale.map(ScaleState::zoom_out);
        self.scale
    }

    pub fn reset_zoom(&mut self) -> Option<ScaleState> {
        self.scale = self.scale.map(ScaleState::reset);
        self.scale
    }

    /// Load the selected image from disk and render its preview.
    pub fn render(
        &mut self,
        spec: &WatermarkSpec,
        fonts: &impl FontProvider,
    ) -> Result<PreviewFrame, PhotomarkError> {
        let path = self
            .current_path()
            .ok_or(PhotomarkError::NoImageSelected)?
            .to_path_buf();
        let image = load_image(&path)?;
        Ok(self.render_image(&image, spec, fonts)?)
    }

    /// Render a preview of an already decoded image.
    ///
    /// The image is downscaled first and the watermark is drawn on the scaled
    /// copy with `round(font_size * ratio)`, so placement uses the same anchor
    /// logic as the export at preview resolution.
    pub fn render_image(
        &mut self,
        image: &DynamicImage,
        spec: &WatermarkSpec,
        fonts: &impl FontProvider,
    ) -> Result<PreviewFrame, ImageError> {
        let original = (image.width(), image.height());
        let scale = match self.scale {
            Some(state) if state.original() == original && state.container() == self.container => {
                state
            }
            _ => ScaleState::fit(original, self.container),
        };
        self.scale = Some(scale);

        let (scaled_w, scaled_h) = scale.scaled_size();
        let scaled = resize_image(image, scaled_w, scaled_h)?;

        let font_size = scale.preview_font_size(spec.font_size);
        let watermarked = apply_watermark_with_font_size(&scaled, spec, fonts, font_size);

        Ok(PreviewFrame {
            image: watermarked.into_rgba8(),
            offset: scale.centered_offset(),
            scale,
            font_size,
        })
    }

    /// One-line description of the current preview state.
    pub fn status_line(&self) -> String {
        match (self.current, self.current_path()) {
            (Some(idx), Some(path)) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let percent = self.scale.map(|s| s.percent()).unwrap_or(100);
                format!(
                    "Previewing {} ({} of {}, {}%)",
                    name,
                    idx + 1,
                    self.images.len(),
                    percent
                )
            }
            _ => "No image selected".to_string(),
        }
    }
}

/// Lanczos3 resample to exactly `width` x `height`.
fn resize_image(img: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage, ImageError> {
    if (img.width(), img.height()) == (width, height) {
        return Ok(img.clone());
    }

    let non_zero = |value: u32| {
        NonZeroU32::new(value).ok_or_else(|| {
            ImageError::resize_failed(format!(
                "cannot resize {}x{} to {}x{}",
                img.width(),
                img.height(),
                width,
                height
            ))
        })
    };

    let src = Image::from_vec_u8(
        non_zero(img.width())?,
        non_zero(img.height())?,
        img.to_rgba8().into_raw(),
        PixelType::U8x4,
    )
    .map_err(|e| ImageError::resize_failed(e.to_string()))?;
    let mut dst = Image::new(non_zero(width)?, non_zero(height)?, PixelType::U8x4);

    Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3))
        .resize(&src.view(), &mut dst.view_mut())
        .map_err(|e| ImageError::resize_failed(e.to_string()))?;

    RgbaImage::from_raw(width, height, dst.into_vec())
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| ImageError::resize_failed("resized buffer has the wrong length"))
}
