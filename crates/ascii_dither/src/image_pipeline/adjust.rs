use super::resize::SampleGrid;

const RED_WEIGHT: f32 = 0.2126;
const GREEN_WEIGHT: f32 = 0.7152;
const BLUE_WEIGHT: f32 = 0.0722;

/// Rec. 709 weighted luminance of an sRGB byte triple, in `[0, 1]`.
pub fn relative_luminance(r: u8, g: u8, b: u8) -> f32 {
    let weighted =
        RED_WEIGHT * f32::from(r) + GREEN_WEIGHT * f32::from(g) + BLUE_WEIGHT * f32::from(b);
    (weighted / 255.0).clamp(0.0, 1.0)
}

/// Perceptual brightness of a pixel after gamma and optional inversion.
///
/// `gamma` below 1 lifts midtones, above 1 darkens them. Callers validate that it is positive.
pub fn luminance(r: u8, g: u8, b: u8, gamma: f32, invert: bool) -> f32 {
    let value = relative_luminance(r, g, b).powf(gamma).clamp(0.0, 1.0);
    if invert {
        1.0 - value
    } else {
        value
    }
}

/// Fills `field` with one brightness value per sampled cell.
pub fn fill_brightness(samples: &SampleGrid, gamma: f32, invert: bool, field: &mut Vec<f32>) {
    field.clear();
    field.extend(samples.pixels().map(|[r, g, b, _]| luminance(r, g, b, gamma, invert)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_map_to_unit_range() {
        assert_eq!(luminance(0, 0, 0, 1.0, false), 0.0);
        assert!((luminance(255, 255, 255, 1.0, false) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn invert_flips_brightness() {
        assert!((luminance(255, 255, 255, 1.0, true)).abs() < 1e-6);
        assert_eq!(luminance(0, 0, 0, 1.0, true), 1.0);
    }

    #[test]
    fn green_dominates_weighting() {
        assert!(luminance(0, 255, 0, 1.0, false) > luminance(255, 0, 0, 1.0, false));
        assert!(luminance(255, 0, 0, 1.0, false) > luminance(0, 0, 255, 1.0, false));
    }

    #[test]
    fn gamma_below_one_lifts_midtones() {
        let base = luminance(128, 128, 128, 1.0, false);
        assert!(luminance(128, 128, 128, 0.5, false) > base);
        assert!(luminance(128, 128, 128, 2.0, false) < base);
    }

    #[test]
    fn fill_brightness_replaces_previous_contents() {
        let samples = SampleGrid::from_rgba(image::RgbaImage::from_pixel(
            2,
            1,
            image::Rgba([0, 0, 0, 255]),
        ));
        let mut field = vec![0.7; 5];
        fill_brightness(&samples, 1.0, false, &mut field);
        assert_eq!(field, vec![0.0, 0.0]);
    }
}
