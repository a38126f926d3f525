use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use ascii_dither::{
    escape_html, save_cells, AsciiConverter, Calibrator, CharsetSpec, ConversionResult,
    ConvertParams, DecodedImage, Preset, RasterProvider,
};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "gif", "bmp", "ico", "pnm", "pbm", "pgm", "ppm", "tif", "tiff", "webp"];

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert images to calibrated, dithered ASCII art")]
struct Cli {
    /// Log debug output (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render ASCII art to stdout for a quick preview
    Preview(PreviewArgs),
    /// Convert an image and write text, HTML or PNG depending on the output extension
    Convert(ConvertArgs),
    /// Convert every image in a directory to text files
    Batch(BatchArgs),
    /// Print the calibrated ramp and brightness levels of a charset
    Calibrate(CalibrateArgs),
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input image path
    input: PathBuf,
    /// Target column width
    #[arg(long, default_value_t = 100)]
    width: u32,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input image path
    input: PathBuf,
    /// Output file path (.txt, .html or .png)
    #[arg(short, long)]
    output: PathBuf,
    /// Target column width
    #[arg(long, default_value_t = 120)]
    width: u32,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Directory searched recursively for images
    input: PathBuf,
    /// Output directory for text files
    #[arg(short, long)]
    out_dir: PathBuf,
    /// Target column width
    #[arg(long, default_value_t = 120)]
    width: u32,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct CalibrateArgs {
    #[command(flatten)]
    glyphs: GlyphSettings,
}

#[derive(Parser, Debug, Clone)]
struct GlyphSettings {
    /// Charset preset to calibrate
    #[arg(long, value_enum, default_value = "standard")]
    charset: CharsetPreset,
    /// Custom glyphs, overriding --charset
    #[arg(long)]
    chars: Option<String>,
    /// TrueType/OpenType font used to measure glyph density
    #[arg(long)]
    font: Option<PathBuf>,
    /// Skip measuring and space glyphs evenly in the given order
    #[arg(long, default_value_t = false)]
    no_calibrate: bool,
}

#[derive(Parser, Debug, Clone)]
struct RenderSettings {
    #[command(flatten)]
    glyphs: GlyphSettings,
    /// Gamma applied to luminance (<1 brightens midtones, >1 darkens)
    #[arg(long, default_value_t = 1.0)]
    gamma: f32,
    /// Invert luminance before processing
    #[arg(long, default_value_t = false)]
    invert: bool,
    /// Colour each cell with its source pixel (HTML and PNG output)
    #[arg(long, default_value_t = false)]
    color: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CharsetPreset {
    Detailed,
    Standard,
    Blocks,
    Binary,
    Minimal,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Preview(args) => preview(args),
        Commands::Convert(args) => convert(args),
        Commands::Batch(args) => batch(args),
        Commands::Calibrate(args) => calibrate(args),
    }
}

fn init_logging(verbose: bool) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn preview(args: PreviewArgs) -> Result<()> {
    let charset = args.settings.glyphs.charset()?;
    let params = args.settings.to_params(args.width);
    let output = render_path(&args.input, &charset, &params)?;
    println!("{}", output.text);
    Ok(())
}

fn convert(args: ConvertArgs) -> Result<()> {
    let charset = args.settings.glyphs.charset()?;
    let params = args.settings.to_params(args.width);
    let output = render_path(&args.input, &charset, &params)?;

    match OutputFormat::for_path(&args.output) {
        OutputFormat::Text => write_text(&args.output, &output.text),
        OutputFormat::Html => write_html(&args.output, &output),
        OutputFormat::Png => save_cells(&output.cells, args.settings.color, &args.output)
            .with_context(|| format!("failed to write {:?}", args.output)),
    }
}

fn batch(args: BatchArgs) -> Result<()> {
    let charset = args.settings.glyphs.charset()?;
    let params = args.settings.to_params(args.width);
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create output directory {:?}", args.out_dir))?;

    let inputs = collect_images(&args.input)?;
    let progress = ProgressBar::new(inputs.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} images",
        )
        .context("invalid progress template")?
        .progress_chars("=> "),
    );

    let mut converter = AsciiConverter::new();
    let mut failures = 0usize;
    for input in &inputs {
        let result = DecodedImage::open(input)
            .and_then(|image| converter.convert(&image, &charset, &params))
            .with_context(|| format!("failed to render {input:?}"));

        match result {
            Ok(output) => {
                let stem = input.file_stem().and_then(|stem| stem.to_str()).unwrap_or("image");
                let path = args.out_dir.join(format!("{stem}.txt"));
                write_text(&path, &output.text)?;
            },
            Err(err) => {
                warn!("{err:#}");
                failures += 1;
            },
        }
        progress.inc(1);
    }

    progress.finish_with_message(format!("Text written to {:?}", args.out_dir));
    if failures > 0 {
        anyhow::bail!("{failures} of {} images failed to convert", inputs.len());
    }
    Ok(())
}

fn calibrate(args: CalibrateArgs) -> Result<()> {
    let charset = args.glyphs.charset()?;
    println!("ramp={}", charset.ramp_string());
    for (glyph, level) in charset.ramp().iter().zip(charset.levels()) {
        println!("{glyph:?}\t{level:.4}");
    }
    Ok(())
}

fn render_path(
    path: &Path,
    charset: &CharsetSpec,
    params: &ConvertParams,
) -> Result<ConversionResult> {
    let image = DecodedImage::open(path).with_context(|| format!("failed to open {path:?}"))?;
    AsciiConverter::new()
        .convert(&image, charset, params)
        .with_context(|| format!("failed to render {path:?}"))
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("failed to create {path:?}"))?;
    writeln!(file, "{text}").with_context(|| format!("failed to write {path:?}"))?;
    Ok(())
}

fn write_html(path: &Path, output: &ConversionResult) -> Result<()> {
    // Without colour there is no markup, only the plain grid.
    let body = if output.html.is_empty() { escape_html(&output.text) } else { output.html.clone() };
    let title = path.file_stem().and_then(|stem| stem.to_str()).unwrap_or("ascii");

    let mut file = File::create(path).with_context(|| format!("failed to create {path:?}"))?;
    write!(
        file,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n\
         <body>\n<pre style=\"font-family:monospace;line-height:1\">\n{body}\n</pre>\n</body>\n\
         </html>\n",
        escape_html(title)
    )
    .with_context(|| format!("failed to write {path:?}"))?;
    Ok(())
}

fn collect_images(path: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .filter(|path| has_image_extension(path))
        .collect();
    entries.sort();
    if entries.is_empty() {
        anyhow::bail!("no image files found in {:?}", path);
    }
    debug!("found {} images under {:?}", entries.len(), path);
    Ok(entries)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Html,
    Png,
}

impl OutputFormat {
    fn for_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "html" | "htm" => OutputFormat::Html,
            "png" => OutputFormat::Png,
            _ => OutputFormat::Text,
        }
    }
}

impl GlyphSettings {
    fn raw_chars(&self) -> String {
        match &self.chars {
            Some(chars) => chars.clone(),
            None => self.charset.to_preset().chars().to_owned(),
        }
    }

    fn charset(&self) -> Result<Arc<CharsetSpec>> {
        let raw = self.raw_chars();
        let mut calibrator = if self.no_calibrate {
            Calibrator::headless()
        } else if let Some(font) = &self.font {
            let bytes = fs::read(font).with_context(|| format!("failed to read font {font:?}"))?;
            let provider = RasterProvider::from_font_bytes(bytes)
                .with_context(|| format!("failed to load font {font:?}"))?;
            Calibrator::new(provider)
        } else {
            Calibrator::default()
        };

        let charset = calibrator.calibrate(&raw);
        if charset.is_empty() {
            warn!("charset is empty, output will be blank");
        }
        Ok(charset)
    }
}

impl RenderSettings {
    fn to_params(&self, width: u32) -> ConvertParams {
        ConvertParams::default()
            .with_columns(width)
            .with_gamma(self.gamma)
            .inverted(self.invert)
            .colorized(self.color)
    }
}

impl CharsetPreset {
    fn to_preset(self) -> Preset {
        match self {
            CharsetPreset::Detailed => Preset::Detailed,
            CharsetPreset::Standard => Preset::Standard,
            CharsetPreset::Blocks => Preset::Blocks,
            CharsetPreset::Binary => Preset::Binary,
            CharsetPreset::Minimal => Preset::Minimal,
        }
    }
}
