//! Batch export of watermarked images.
//!
//! Export runs sequentially: each source is loaded, watermarked at full
//! resolution and saved before the next one starts. A failing image is logged
//! and counted, and the batch moves on. Only invalid input (no images, empty
//! text, no output directory, invalid spec) stops the export before it begins.
//!
//! Output files are named `watermarked_<stem><ext>` inside the output
//! directory and silently replace existing files with the same name.

pub mod codec;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::ImageError;
use crate::watermark::{apply_watermark, FontProvider, WatermarkError, WatermarkSpec};
use codec::{load_image, save_image, OutputFormat};

/// File extensions accepted as sources (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "tiff"];

/// Prefix added to every exported file name.
pub const OUTPUT_PREFIX: &str = "watermarked_";

/// Input rejected before any image is processed.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No images selected")]
    NoImagesSelected,

    #[error("Watermark text is empty")]
    EmptyWatermarkText,

    #[error("No output directory chosen")]
    NoOutputDirectory,

    #[error("Invalid watermark settings: {0}")]
    InvalidSpec(#[from] WatermarkError),
}

/// Whether a path has a supported image extension.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Keep only paths with supported image extensions, preserving order.
pub fn filter_image_paths<I, P>(paths: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    paths
        .into_iter()
        .map(Into::<PathBuf>::into)
        .filter(|path| is_supported_image(path))
        .collect()
}

/// Supported images directly inside `dir`, sorted by path.
pub fn collect_folder(dir: &Path) -> Result<Vec<PathBuf>, ImageError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ImageError::io(dir, e))?;

    let mut images = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ImageError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() && is_supported_image(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

/// `watermarked_<stem><ext>` for a source path, keeping the extension's case.
pub fn output_file_name(source: &Path) -> Option<String> {
    let stem = source.file_stem()?.to_string_lossy();
    let name = match source.extension() {
        Some(ext) => format!("{}{}.{}", OUTPUT_PREFIX, stem, ext.to_string_lossy()),
        None => format!("{}{}", OUTPUT_PREFIX, stem),
    };
    Some(name)
}

/// Everything needed to run one export.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub sources: Vec<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub spec: WatermarkSpec,
}

impl ExportRequest {
    pub fn new(sources: Vec<PathBuf>, output_dir: impl Into<PathBuf>, spec: WatermarkSpec) -> Self {
        Self {
            sources,
            output_dir: Some(output_dir.into()),
            spec,
        }
    }

    /// Pre-flight checks, in the order a user would be warned about them.
    ///
    /// Returns the output directory and the spec to export with. Surrounding
    /// whitespace is trimmed from the text.
    pub fn validate(&self) -> Result<(&Path, WatermarkSpec), ExportError> {
        if self.sources.is_empty() {
            return Err(ExportError::NoImagesSelected);
        }

        let text = self.spec.text.trim();
        if text.is_empty() {
            return Err(ExportError::EmptyWatermarkText);
        }

        let output_dir = self
            .output_dir
            .as_deref()
            .ok_or(ExportError::NoOutputDirectory)?;

        let spec = self.spec.clone().with_text(text);
        spec.validate()?;

        Ok((output_dir, spec))
    }
}

/// Progress after each processed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportProgress {
    /// 1-based index of the image just processed
    pub index: usize,
    pub total: usize,
    /// Successes so far
    pub succeeded: usize,
}

/// One image that could not be exported.
#[derive(Debug)]
pub struct ExportFailure {
    pub source: PathBuf,
    pub error: ImageError,
}

/// Outcome of a batch export.
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub total: usize,
    /// Paths of files that were written
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<ExportFailure>,
}

impl ExportSummary {
    pub fn succeeded(&self) -> usize {
        self.outputs.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Load, watermark and save one image. Returns the written path.
pub fn process_single_image(
    source: &Path,
    output_dir: &Path,
    spec: &WatermarkSpec,
    fonts: &impl FontProvider,
) -> Result<PathBuf, ImageError> {
    let file_name = output_file_name(source).ok_or_else(|| {
        ImageError::io(
            source,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    let output_path = output_dir.join(file_name);

    let original = load_image(source)?;
    let watermarked = apply_watermark(&original, spec, fonts);
    save_image(&watermarked, &output_path, OutputFormat::for_source(source))?;

    Ok(output_path)
}

/// Export every source in the request.
pub fn export_batch(
    request: &ExportRequest,
    fonts: &impl FontProvider,
) -> Result<ExportSummary, ExportError> {
    export_batch_with_progress(request, fonts, |_| {})
}

/// Export every source, reporting progress after each image.
pub fn export_batch_with_progress(
    request: &ExportRequest,
    fonts: &impl FontProvider,
    mut on_progress: impl FnMut(&ExportProgress),
) -> Result<ExportSummary, ExportError> {
    let (output_dir, spec) = request.validate()?;

    let total = request.sources.len();
    let mut summary = ExportSummary {
        total,
        ..ExportSummary::default()
    };

    tracing::info!(
        images = total,
        output_dir = %output_dir.display(),
        anchor = %spec.anchor,
        font_size = spec.font_size,
        opacity = spec.opacity,
        "Starting export"
    );

    for (idx, source) in request.sources.iter().enumerate() {
        match process_single_image(source, output_dir, &spec, fonts) {
            Ok(output) => {
                tracing::debug!(
                    source = %source.display(),
                    output = %output.display(),
                    "Image exported"
                );
                summary.outputs.push(output);
            }
            Err(error) => {
                tracing::warn!(
                    source = %source.display(),
                    error = %error,
                    "Skipping image that failed to export"
                );
                summary.failures.push(ExportFailure {
                    source: source.clone(),
                    error,
                });
            }
        }

        on_progress(&ExportProgress {
            index: idx + 1,
            total,
            succeeded: summary.succeeded(),
        });
    }

    tracing::info!(
        succeeded = summary.succeeded(),
        failed = summary.failed(),
        total,
        "Export finished"
    );

    Ok(summary)
}
