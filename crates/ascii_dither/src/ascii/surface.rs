//! Drawing surfaces used to measure glyph density.
//!
//! Calibration never talks to a font backend directly. It asks a [`SurfaceProvider`] for a
//! [`Surface`] of a given size, draws one glyph at a time and reads the pixels back. Headless
//! callers pass [`NoSurface`], which makes calibration fall back to a uniform ramp.

use std::fmt;
use std::sync::Arc;

use ab_glyph::{Font, FontVec, PxScale};
use font8x8::UnicodeFonts;
use image::{Rgba, RgbaImage};

use crate::AsciiError;

/// Side length of a glyph in the built-in bitmap face.
pub const BITMAP_GLYPH_SIZE: u32 = 8;

pub trait Surface {
    fn fill(&mut self, color: Rgba<u8>);

    /// Draws `ch` centred on the surface.
    ///
    /// Returns `false` when the face has no glyph for `ch`; the surface is left untouched.
    fn draw_glyph(&mut self, ch: char, size_px: f32, color: Rgba<u8>) -> bool;

    fn pixels(&self) -> &RgbaImage;
}

pub trait SurfaceProvider: Send + Sync {
    /// Returns `None` when no drawing surface can be obtained.
    fn create(&self, width: u32, height: u32) -> Option<Box<dyn Surface>>;
}

/// Provider for environments without any way to rasterize text.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSurface;

impl SurfaceProvider for NoSurface {
    fn create(&self, _width: u32, _height: u32) -> Option<Box<dyn Surface>> {
        None
    }
}

#[derive(Clone)]
enum Face {
    Bitmap,
    Outline(Arc<FontVec>),
}

impl fmt::Debug for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Face::Bitmap => f.write_str("Bitmap"),
            Face::Outline(_) => f.write_str("Outline"),
        }
    }
}

/// Software rasterizer backed either by the built-in 8x8 bitmap face or an outline font.
#[derive(Clone, Debug)]
pub struct RasterProvider {
    face: Face,
}

impl RasterProvider {
    pub fn bitmap() -> Self {
        Self { face: Face::Bitmap }
    }

    /// Loads a TrueType or OpenType font to draw glyphs with.
    pub fn from_font_bytes(bytes: Vec<u8>) -> Result<Self, AsciiError> {
        let font = FontVec::try_from_vec(bytes).map_err(|_| AsciiError::InvalidFont)?;
        Ok(Self { face: Face::Outline(Arc::new(font)) })
    }
}

impl Default for RasterProvider {
    fn default() -> Self {
        Self::bitmap()
    }
}

impl SurfaceProvider for RasterProvider {
    fn create(&self, width: u32, height: u32) -> Option<Box<dyn Surface>> {
        if width == 0 || height == 0 {
            return None;
        }

        let canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        Some(Box::new(RasterSurface { canvas, face: self.face.clone() }))
    }
}

struct RasterSurface {
    canvas: RgbaImage,
    face: Face,
}

impl Surface for RasterSurface {
    fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = color;
        }
    }

    fn draw_glyph(&mut self, ch: char, size_px: f32, color: Rgba<u8>) -> bool {
        match &self.face {
            Face::Bitmap => draw_bitmap(&mut self.canvas, ch, size_px, color),
            Face::Outline(font) => draw_outline(&mut self.canvas, font, ch, size_px, color),
        }
    }

    fn pixels(&self) -> &RgbaImage {
        &self.canvas
    }
}

/// Looks `ch` up across the bitmap face's code blocks.
///
/// Each row is a byte whose least significant bit is the leftmost pixel.
pub(crate) fn bitmap_glyph(ch: char) -> Option<[u8; 8]> {
    font8x8::BASIC_FONTS
        .get(ch)
        .or_else(|| font8x8::LATIN_FONTS.get(ch))
        .or_else(|| font8x8::BLOCK_FONTS.get(ch))
        .or_else(|| font8x8::BOX_FONTS.get(ch))
        .or_else(|| font8x8::GREEK_FONTS.get(ch))
        .or_else(|| font8x8::MISC_FONTS.get(ch))
}

fn draw_bitmap(canvas: &mut RgbaImage, ch: char, size_px: f32, color: Rgba<u8>) -> bool {
    let Some(glyph) = bitmap_glyph(ch) else {
        return false;
    };

    let scale = ((size_px / BITMAP_GLYPH_SIZE as f32).round() as u32).max(1);
    let side = BITMAP_GLYPH_SIZE * scale;
    let left = canvas.width().saturating_sub(side) / 2;
    let top = canvas.height().saturating_sub(side) / 2;

    for (gy, &bits) in glyph.iter().enumerate() {
        for gx in 0..BITMAP_GLYPH_SIZE {
            if (bits >> gx) & 1 == 0 {
                continue;
            }

            let x0 = left + gx * scale;
            let y0 = top + gy as u32 * scale;
            for y in y0..(y0 + scale).min(canvas.height()) {
                for x in x0..(x0 + scale).min(canvas.width()) {
                    canvas.put_pixel(x, y, color);
                }
            }
        }
    }

    true
}

fn draw_outline(
    canvas: &mut RgbaImage,
    font: &FontVec,
    ch: char,
    size_px: f32,
    color: Rgba<u8>,
) -> bool {
    let id = font.glyph_id(ch);
    if id.0 == 0 {
        return false;
    }

    let glyph = id.with_scale(PxScale::from(size_px));
    let Some(outlined) = font.outline_glyph(glyph) else {
        // Known glyph without an outline, e.g. whitespace.
        return true;
    };

    let bounds = outlined.px_bounds();
    let left = ((canvas.width() as f32 - bounds.width()) / 2.0).round() as i64;
    let top = ((canvas.height() as f32 - bounds.height()) / 2.0).round() as i64;
    let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));

    outlined.draw(|x, y, coverage| {
        let px = left + i64::from(x);
        let py = top + i64::from(y);
        if px < 0 || py < 0 || px >= width || py >= height {
            return;
        }

        let coverage = coverage.clamp(0.0, 1.0);
        let pixel = canvas.get_pixel_mut(px as u32, py as u32);
        for channel in 0..3 {
            let base = f32::from(pixel.0[channel]);
            let ink = f32::from(color.0[channel]);
            pixel.0[channel] = (base * (1.0 - coverage) + ink * coverage).round() as u8;
        }
    });

    true
}
