use anyhow::bail;
use clap::{Args, Parser, Subcommand};
use image::DynamicImage;
use photomark::config::AppConfig;
use photomark::export::codec::{save_image, OutputFormat};
use photomark::export::{collect_folder, export_batch_with_progress, is_supported_image, ExportRequest};
use photomark::preview::PreviewSession;
use photomark::watermark::{parse_hex_color, Anchor, ResolvedFonts, WatermarkSpec};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Photomark - batch text watermarking for photos
#[derive(Parser, Debug)]
#[command(name = "photomark")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watermark images and write them to an output directory
    Export {
        #[command(flatten)]
        watermark: WatermarkArgs,

        /// Directory for watermarked files
        #[arg(short, long)]
        output: PathBuf,

        /// Image files or folders (folders are not searched recursively)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Render a scaled preview of one image to a PNG file
    Preview {
        #[command(flatten)]
        watermark: WatermarkArgs,

        /// Preview container size, e.g. 800x600
        #[arg(long, default_value = "800x600", value_parser = parse_container)]
        container: (u32, u32),

        /// Where to write the preview PNG
        #[arg(long)]
        out: PathBuf,

        /// Index of the image to preview (0-based)
        #[arg(long, default_value_t = 0)]
        select: usize,

        /// Zoom in this many steps
        #[arg(long, default_value_t = 0)]
        zoom_in: u32,

        /// Zoom out this many steps
        #[arg(long, default_value_t = 0)]
        zoom_out: u32,

        /// Image files or folders
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Print the effective configuration as YAML
    ShowConfig,
}

/// Overrides for the configured watermark defaults.
#[derive(Args, Debug, Default)]
struct WatermarkArgs {
    /// Watermark text
    #[arg(short, long)]
    text: Option<String>,

    /// Font size in pixels
    #[arg(long)]
    font_size: Option<u32>,

    /// Text color as #RRGGBB or #RGB
    #[arg(long)]
    color: Option<String>,

    /// Opacity from 0 to 100
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    opacity: Option<u8>,

    /// One of the nine anchors, e.g. bottom-right
    #[arg(long)]
    anchor: Option<Anchor>,

    /// Font file to try before the configured candidates (repeatable)
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,
}

impl WatermarkArgs {
    fn to_spec(&self, config: &AppConfig) -> anyhow::Result<WatermarkSpec> {
        let mut spec = config.watermark.to_spec()?;
        if let Some(text) = &self.text {
            spec = spec.with_text(text.as_str());
        }
        if let Some(size) = self.font_size {
            spec = spec.with_font_size(size);
        }
        if let Some(color) = &self.color {
            spec = spec.with_color(parse_hex_color(color)?);
        }
        if let Some(opacity) = self.opacity {
            spec = spec.with_opacity(opacity);
        }
        if let Some(anchor) = self.anchor {
            spec = spec.with_anchor(anchor);
        }
        spec.validate()?;
        Ok(spec)
    }
}

fn parse_container(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let w: u32 = w.trim().parse().map_err(|_| format!("invalid width '{}'", w))?;
    let h: u32 = h.trim().parse().map_err(|_| format!("invalid height '{}'", h))?;
    if w == 0 || h == 0 {
        return Err("container dimensions must be positive".to_string());
    }
    Ok((w, h))
}

/// Expand files and folders into a list of supported image paths.
fn expand_inputs(inputs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = collect_folder(input)?;
            tracing::info!(folder = %input.display(), images = found.len(), "Scanned folder");
            images.extend(found);
        } else if is_supported_image(input) {
            images.push(input.clone());
        } else {
            tracing::warn!(path = %input.display(), "Ignoring unsupported file");
        }
    }
    Ok(images)
}

fn run_export(
    config: &AppConfig,
    watermark: &WatermarkArgs,
    output: &Path,
    inputs: &[PathBuf],
) -> anyhow::Result<ExitCode> {
    let spec = watermark.to_spec(config)?;
    let fonts = ResolvedFonts::resolve(&config.font_sources(&watermark.fonts));
    let sources = expand_inputs(inputs)?;

    let request = ExportRequest::new(sources, output, spec);
    request.validate()?;

    // A directory that cannot be created shows up as a write failure per image
    if let Err(e) = std::fs::create_dir_all(output) {
        tracing::warn!(output_dir = %output.display(), error = %e, "Failed to create output directory");
    }

    let summary = export_batch_with_progress(&request, &fonts, |progress| {
        tracing::info!(
            index = progress.index,
            total = progress.total,
            succeeded = progress.succeeded,
            "Processing {}/{}",
            progress.index,
            progress.total
        );
    })?;

    for failure in &summary.failures {
        eprintln!("failed: {}: {}", failure.source.display(), failure.error);
    }
    println!(
        "Exported {} of {} images to {}",
        summary.succeeded(),
        summary.total,
        output.display()
    );

    Ok(if summary.is_complete() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[allow(clippy::too_many_arguments)]
fn run_preview(
    config: &AppConfig,
    watermark: &WatermarkArgs,
    container: (u32, u32),
    out: &Path,
    select: usize,
    zoom_in: u32,
    zoom_out: u32,
    inputs: &[PathBuf],
) -> anyhow::Result<ExitCode> {
    let spec = watermark.to_spec(config)?;
    let fonts = ResolvedFonts::resolve(&config.font_sources(&watermark.fonts));

    let mut session = PreviewSession::new(container);
    session.add_images(expand_inputs(inputs)?);
    if !session.select(select) {
        bail!(
            "Cannot select image {}: {} image(s) loaded",
            select,
            session.images().len()
        );
    }

    // The first render establishes the fit scale that zoom steps start from
    let mut frame = session.render(&spec, &fonts)?;
    if zoom_in > 0 || zoom_out > 0 {
        for _ in 0..zoom_in {
            session.zoom_in();
        }
        for _ in 0..zoom_out {
            session.zoom_out();
        }
        frame = session.render(&spec, &fonts)?;
    }

    let (width, height) = frame.image.dimensions();
    save_image(&DynamicImage::ImageRgba8(frame.image), out, OutputFormat::Png)?;

    println!("{}", session.status_line());
    println!(
        "Wrote {}x{} preview to {} (offset {},{}, font size {})",
        width,
        height,
        out.display(),
        frame.offset.0,
        frame.offset.1,
        frame.font_size
    );
    Ok(ExitCode::SUCCESS)
}

fn run(cli: Cli, config: AppConfig) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Export {
            watermark,
            output,
            inputs,
        } => run_export(&config, &watermark, &output, &inputs),
        Command::Preview {
            watermark,
            container,
            out,
            select,
            zoom_in,
            zoom_out,
            inputs,
        } => run_preview(
            &config, &watermark, container, &out, select, zoom_in, zoom_out, &inputs,
        ),
        Command::ShowConfig => {
            print!("{}", config.to_yaml()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Load configuration from defaults and PHOTOMARK_* environment variables
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging subsystem
    if let Err(e) = photomark::logging::init_subscriber(&config.logging) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    tracing::debug!(
        log_format = ?config.logging.format,
        font_candidates = config.fonts.candidates.len(),
        "Configuration loaded"
    );

    match run(cli, config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photomark::export::ExportError;

    #[test]
    fn test_parse_container() {
        assert_eq!(parse_container("800x600"), Ok((800, 600)));
        assert_eq!(parse_container("1024X768"), Ok((1024, 768)));
        assert!(parse_container("800").is_err());
        assert!(parse_container("0x600").is_err());
        assert!(parse_container("axb").is_err());
    }

    #[test]
    fn test_cli_parses_export() {
        let cli = Cli::try_parse_from([
            "photomark",
            "export",
            "--text",
            "Hello",
            "--anchor",
            "top-left",
            "--opacity",
            "50",
            "--font",
            "/a.ttf",
            "--output",
            "/out",
            "a.jpg",
            "b.png",
        ])
        .unwrap();

        match cli.command {
            Command::Export {
                watermark,
                output,
                inputs,
            } => {
                assert_eq!(watermark.text.as_deref(), Some("Hello"));
                assert_eq!(watermark.anchor, Some(Anchor::TopLeft));
                assert_eq!(watermark.opacity, Some(50));
                assert_eq!(watermark.fonts, vec![PathBuf::from("/a.ttf")]);
                assert_eq!(output, PathBuf::from("/out"));
                assert_eq!(inputs.len(), 2);
            }
            other => panic!("Expected export command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_out_of_range_opacity_and_bad_anchor() {
        assert!(Cli::try_parse_from(["photomark", "export", "--opacity", "101", "-o", "/o", "a.jpg"]).is_err());
        assert!(Cli::try_parse_from(["photomark", "export", "--anchor", "left", "-o", "/o", "a.jpg"]).is_err());
    }

    #[test]
    fn test_export_with_no_images_leaves_output_untouched() {
        let tmp = tempfile::TempDir::new().unwrap();
        let empty = tmp.path().join("empty");
        std::fs::create_dir(&empty).unwrap();
        let output = tmp.path().join("out");

        let result = run_export(&AppConfig::default(), &WatermarkArgs::default(), &output, &[empty]);

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExportError>(),
            Some(ExportError::NoImagesSelected)
        ));
        assert!(!output.exists(), "output directory created before validation");
    }

    #[test]
    fn test_export_into_uncreatable_directory_counts_failures() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("a.png");
        let blank = image::RgbaImage::from_pixel(40, 30, image::Rgba([255, 255, 255, 255]));
        save_image(&DynamicImage::ImageRgba8(blank), &source, OutputFormat::Png).unwrap();

        // A regular file where a parent directory is expected
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        let output = blocker.join("out");

        let result = run_export(&AppConfig::default(), &WatermarkArgs::default(), &output, &[source]);

        // The batch runs and reports the failure instead of aborting
        assert!(result.is_ok(), "Expected a completed batch, got {:?}", result.err());
        assert!(!output.exists());
    }

    #[test]
    fn test_watermark_args_override_defaults() {
        let config = AppConfig::default();
        let args = WatermarkArgs {
            text: Some("Mine".to_string()),
            color: Some("#0000ff".to_string()),
            ..WatermarkArgs::default()
        };

        let spec = args.to_spec(&config).unwrap();
        assert_eq!(spec.text, "Mine");
        assert_eq!(spec.color.to_hex(), "#0000FF");
        // Unset options keep the configured defaults
        assert_eq!(spec.font_size, 48);
        assert_eq!(spec.opacity, 70);
        assert_eq!(spec.anchor, Anchor::BottomRight);
    }
}
