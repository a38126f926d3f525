use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use image::Rgba;
use log::{debug, warn};

use super::surface::{NoSurface, RasterProvider, Surface, SurfaceProvider};

/// Side length of the square canvas each glyph is measured on.
pub const CALIBRATION_CANVAS: u32 = 64;

/// Font size glyphs are drawn at while measuring.
pub const CALIBRATION_FONT_PX: f32 = 48.0;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// A glyph ramp ordered by measured brightness, darkest glyph first.
#[derive(Clone, Debug, PartialEq)]
pub struct CharsetSpec {
    raw: String,
    ramp: Vec<char>,
    /// Normalized brightness of each ramp glyph, non-decreasing.
    levels: Vec<f32>,
}

impl CharsetSpec {
    pub fn empty() -> Self {
        Self { raw: String::new(), ramp: Vec::new(), levels: Vec::new() }
    }

    /// Ramp used when glyphs cannot be measured: input order, evenly spaced levels.
    pub fn uniform(raw: &str) -> Self {
        let ramp: Vec<char> = raw.chars().collect();
        let levels = match ramp.len() {
            0 => Vec::new(),
            1 => vec![0.0],
            len => {
                let last = (len - 1) as f32;
                (0..len).map(|index| index as f32 / last).collect()
            },
        };

        Self { raw: raw.to_owned(), ramp, levels }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn ramp(&self) -> &[char] {
        &self.ramp
    }

    pub fn ramp_string(&self) -> String {
        self.ramp.iter().collect()
    }

    pub fn levels(&self) -> &[f32] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.ramp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ramp.is_empty()
    }
}

/// Measures glyph ramps and remembers every ramp it has produced.
pub struct Calibrator {
    provider: Box<dyn SurfaceProvider>,
    cache: HashMap<String, Arc<CharsetSpec>>,
}

impl Calibrator {
    pub fn new<P: SurfaceProvider + 'static>(provider: P) -> Self {
        Self { provider: Box::new(provider), cache: HashMap::new() }
    }

    /// Calibrator that never measures and always yields uniform ramps.
    pub fn headless() -> Self {
        Self::new(NoSurface)
    }

    pub fn calibrate(&mut self, raw: &str) -> Arc<CharsetSpec> {
        if let Some(spec) = self.cache.get(raw) {
            return Arc::clone(spec);
        }

        let spec = Arc::new(measure(self.provider.as_ref(), raw));
        self.cache.insert(raw.to_owned(), Arc::clone(&spec));
        spec
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new(RasterProvider::bitmap())
    }
}

fn measure(provider: &dyn SurfaceProvider, raw: &str) -> CharsetSpec {
    if raw.is_empty() {
        return CharsetSpec::empty();
    }

    let mut seen = HashSet::new();
    let unique: Vec<char> = raw.chars().filter(|&ch| seen.insert(ch)).collect();

    if unique.len() == 1 {
        return CharsetSpec { raw: raw.to_owned(), ramp: unique, levels: vec![0.0] };
    }

    let Some(mut surface) = provider.create(CALIBRATION_CANVAS, CALIBRATION_CANVAS) else {
        debug!("no drawing surface available, using uniform ramp for {raw:?}");
        return CharsetSpec::uniform(raw);
    };

    let mut measured: Vec<(char, f64)> =
        unique.iter().map(|&ch| (ch, glyph_brightness(surface.as_mut(), ch))).collect();

    // Stable: glyphs of equal brightness keep their input order.
    measured.sort_by(|a, b| a.1.total_cmp(&b.1));

    let min = measured[0].1;
    let max = measured[measured.len() - 1].1;
    let range = max - min;

    let ramp = measured.iter().map(|&(ch, _)| ch).collect();
    let levels = measured
        .iter()
        .map(|&(_, brightness)| if range > 0.0 { ((brightness - min) / range) as f32 } else { 0.0 })
        .collect();

    let spec = CharsetSpec { raw: raw.to_owned(), ramp, levels };
    debug!("calibrated {raw:?} into ramp {:?}", spec.ramp_string());
    spec
}

/// Mean luminance of the canvas after drawing `ch`, in `[0, 1]`.
fn glyph_brightness(surface: &mut dyn Surface, ch: char) -> f64 {
    // A space never inks anything; skip drawing to sidestep blank-glyph quirks.
    if ch == ' ' {
        return 1.0;
    }

    surface.fill(BACKGROUND);
    if !surface.draw_glyph(ch, CALIBRATION_FONT_PX, INK) {
        warn!("no glyph for {ch:?}, measuring it as blank");
    }

    let pixels = surface.pixels();
    let count = u64::from(pixels.width()) * u64::from(pixels.height());
    if count == 0 {
        return 1.0;
    }

    let sum: f64 = pixels
        .pixels()
        .map(|pixel| {
            let [r, g, b, _] = pixel.0;
            0.2126 * f64::from(r) + 0.7152 * f64::from(g) + 0.0722 * f64::from(b)
        })
        .sum();

    sum / (count as f64 * 255.0)
}
