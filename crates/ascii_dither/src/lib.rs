mod ascii;
mod image_pipeline;
pub mod session;

use log::trace;

pub use ascii::{
    assemble::{assemble, contrast_foreground, escape_html},
    calibrate::{Calibrator, CharsetSpec, CALIBRATION_CANVAS, CALIBRATION_FONT_PX},
    dither::{quantize, quantize_into},
    grid::{Cell, CellGrid},
    presets::Preset,
    raster::{render_cells, save_cells, CELL_HEIGHT, CELL_WIDTH},
    surface::{NoSurface, RasterProvider, Surface, SurfaceProvider},
};
pub use image_pipeline::{
    adjust::{luminance, relative_luminance},
    loader::{DecodedImage, ImageCache, ImageMeta},
    resize::{sample, SampleGrid, TargetGeometry, CHAR_ASPECT},
};
pub use session::{ConversionSession, Outcome, RequestToken, RequestTracker};

#[derive(Debug, thiserror::Error)]
pub enum AsciiError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("column count must be positive")]
    InvalidColumns,
    #[error("gamma must be a positive finite number, got {0}")]
    InvalidGamma(f32),
    #[error("font data could not be parsed")]
    InvalidFont,
    #[error("failed to export image: {0}")]
    Export(#[source] image::ImageError),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvertParams {
    /// Number of glyph columns in the output.
    pub target_cols: u32,
    pub invert: bool,
    /// Exponent applied to luminance; below 1 brightens midtones, above 1 darkens them.
    pub gamma: f32,
    /// Also build the per-cell coloured HTML.
    pub colorize: bool,
}

impl Default for ConvertParams {
    fn default() -> Self {
        Self { target_cols: 120, invert: false, gamma: 1.0, colorize: false }
    }
}

impl ConvertParams {
    pub fn with_columns(mut self, target_cols: u32) -> Self {
        self.target_cols = target_cols;
        self
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn inverted(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub fn colorized(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }

    fn validate(&self) -> Result<(), AsciiError> {
        if self.target_cols == 0 {
            return Err(AsciiError::InvalidColumns);
        }
        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            return Err(AsciiError::InvalidGamma(self.gamma));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConversionResult {
    /// Glyph rows joined by `\n`.
    pub text: String,
    /// Coloured `<span>` rows joined by `\n`; empty unless colour was requested.
    pub html: String,
    pub cells: CellGrid,
}

impl ConversionResult {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Per-conversion scratch space, resized and zeroed before every use.
#[derive(Debug, Default)]
struct Scratch {
    brightness: Vec<f32>,
    indices: Vec<usize>,
}

impl Scratch {
    fn reset(&mut self, len: usize) {
        self.brightness.clear();
        self.brightness.resize(len, 0.0);
        self.indices.clear();
        self.indices.resize(len, 0);
    }
}

/// Runs the image to glyph pipeline, reusing its buffers between calls.
#[derive(Debug, Default)]
pub struct AsciiConverter {
    scratch: Scratch,
}

impl AsciiConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn convert(
        &mut self,
        image: &DecodedImage,
        charset: &CharsetSpec,
        params: &ConvertParams,
    ) -> Result<ConversionResult, AsciiError> {
        if charset.is_empty() {
            return Ok(ConversionResult::empty());
        }

        params.validate()?;
        let (samples, geometry) = sample(image, params.target_cols)?;
        trace!("sampled {}x{} cells", geometry.columns, geometry.rows);

        self.scratch.reset(samples.len());
        let Scratch { brightness, indices } = &mut self.scratch;

        image_pipeline::adjust::fill_brightness(&samples, params.gamma, params.invert, brightness);
        quantize_into(
            brightness,
            charset.levels(),
            geometry.columns as usize,
            geometry.rows as usize,
            indices,
        );

        Ok(assemble(&samples, indices, charset.ramp(), params.colorize))
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DecodedImage {
        let [r, g, b] = rgb;
        DecodedImage::from_rgba(RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255])))
    }

    #[test]
    fn empty_charset_short_circuits() {
        let mut converter = AsciiConverter::new();
        // Invalid columns are never looked at when there is nothing to draw with.
        let params = ConvertParams::default().with_columns(0);
        let result = converter.convert(&solid(4, 4, [0; 3]), &CharsetSpec::empty(), &params);
        assert_eq!(result.unwrap(), ConversionResult::empty());
    }

    #[test]
    fn rejects_zero_columns() {
        let spec = CharsetSpec::uniform("#.");
        let params = ConvertParams::default().with_columns(0);
        let err = AsciiConverter::new().convert(&solid(4, 4, [0; 3]), &spec, &params).unwrap_err();
        assert!(matches!(err, AsciiError::InvalidColumns));
    }

    #[test]
    fn rejects_bad_gamma() {
        let spec = CharsetSpec::uniform("#.");
        for gamma in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let params = ConvertParams::default().with_gamma(gamma);
            let err =
                AsciiConverter::new().convert(&solid(4, 4, [0; 3]), &spec, &params).unwrap_err();
            assert!(matches!(err, AsciiError::InvalidGamma(_)));
        }
    }

    #[test]
    fn rejects_empty_image() {
        let spec = CharsetSpec::uniform("#.");
        let image = DecodedImage::from_rgba(RgbaImage::new(0, 0));
        let err =
            AsciiConverter::new().convert(&image, &spec, &ConvertParams::default()).unwrap_err();
        assert!(matches!(err, AsciiError::InvalidDimensions { .. }));
    }

    #[test]
    fn black_and_white_map_to_ramp_ends() {
        let spec = CharsetSpec::uniform("#+.");
        let params = ConvertParams::default().with_columns(4);
        let mut converter = AsciiConverter::new();

        let dark = converter.convert(&solid(8, 4, [0; 3]), &spec, &params).unwrap();
        assert_eq!(dark.text, "####");

        let light = converter.convert(&solid(8, 4, [255; 3]), &spec, &params).unwrap();
        assert_eq!(light.text, "....");

        let inverted = converter.convert(&solid(8, 4, [255; 3]), &spec, &params.inverted(true));
        assert_eq!(inverted.unwrap().text, "####");
    }

    #[test]
    fn scratch_does_not_leak_between_sizes() {
        let spec = CharsetSpec::uniform("#.");
        let mut converter = AsciiConverter::new();

        let big = converter.convert(&solid(40, 40, [255; 3]), &spec, &ConvertParams::default());
        assert!(big.unwrap().text.chars().all(|ch| ch == '.' || ch == '\n'));

        let params = ConvertParams::default().with_columns(2);
        let small = converter.convert(&solid(2, 2, [0; 3]), &spec, &params).unwrap();
        assert_eq!(small.text, "##");
        assert_eq!(small.cells.len(), 2);
    }
}
