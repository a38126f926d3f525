use ascii_dither::{
    AsciiConverter, Calibrator, CharsetSpec, ConvertParams, DecodedImage, Preset, CELL_HEIGHT,
    CELL_WIDTH,
};
use image::{Rgba, RgbaImage};

fn gradient(width: u32, height: u32) -> DecodedImage {
    let mut image = RgbaImage::new(width, height);
    for (x, _, pixel) in image.enumerate_pixels_mut() {
        let value = (x * 255 / (width - 1)) as u8;
        *pixel = Rgba([value, value, value, 255]);
    }
    DecodedImage::from_rgba(image)
}

#[test]
fn calibrated_ramp_is_a_permutation_of_unique_input() {
    let mut calibrator = Calibrator::default();
    for preset in Preset::ALL {
        let spec = calibrator.calibrate(preset.chars());

        let mut expected: Vec<char> = preset.chars().chars().collect();
        let mut actual = spec.ramp().to_vec();
        expected.sort_unstable();
        actual.sort_unstable();
        assert_eq!(actual, expected, "{preset:?}");

        assert!(spec.levels().windows(2).all(|pair| pair[0] <= pair[1]), "{preset:?}");
        assert_eq!(spec.levels().first(), Some(&0.0));
        assert_eq!(spec.levels().last(), Some(&1.0));
    }
}

#[test]
fn calibration_is_deterministic_across_calibrators() {
    let first = Calibrator::default().calibrate(Preset::Detailed.chars());
    let second = Calibrator::default().calibrate(Preset::Detailed.chars());
    assert_eq!(first.ramp_string(), second.ramp_string());
    assert_eq!(first.levels(), second.levels());
}

#[test]
fn gradient_runs_from_dense_to_light() {
    let spec = Calibrator::default().calibrate(Preset::Standard.chars());
    let params = ConvertParams::default().with_columns(60);
    let result = AsciiConverter::new().convert(&gradient(240, 120), &spec, &params).unwrap();

    assert_eq!((result.cells.columns, result.cells.rows), (60, 15));
    assert_eq!(result.text.lines().count(), 15);

    let ramp = spec.ramp();
    let position = |ch: char| ramp.iter().position(|&glyph| glyph == ch).unwrap();
    let last = ramp.len() - 1;
    for line in result.text.lines() {
        let positions: Vec<usize> = line.chars().map(position).collect();
        assert_eq!(positions.len(), 60);
        assert!(positions[0] <= 1, "row {line:?}");
        assert!(positions[59] >= last - 1, "row {line:?}");

        let left: usize = positions[..20].iter().sum();
        let right: usize = positions[40..].iter().sum();
        assert!(left < right, "row {line:?}");
    }
}

#[test]
fn colour_output_tracks_source_pixels() {
    let mut image = RgbaImage::from_pixel(4, 2, Rgba([255, 255, 255, 255]));
    for y in 0..2 {
        for x in 2..4 {
            image.put_pixel(x, y, Rgba([0, 0, 0, 255]));
        }
    }

    let spec = CharsetSpec::uniform("#.");
    let params = ConvertParams::default().with_columns(4).colorized(true);
    let result = AsciiConverter::new().convert(&DecodedImage::from_rgba(image), &spec, &params);
    let result = result.unwrap();

    assert_eq!(result.text, "..##");
    assert_eq!(result.cells.cells[0].rgb(), [255, 255, 255]);
    assert_eq!(result.cells.cells[3].rgb(), [0, 0, 0]);
    assert_eq!(result.html.matches("<span").count(), 4);
    assert!(result.html.contains("background-color:rgb(255,255,255);color:rgb(0,0,0)"));
    assert!(result.html.contains("background-color:rgb(0,0,0);color:rgb(255,255,255)"));
}

#[test]
fn empty_charset_returns_empty_result() {
    let mut calibrator = Calibrator::default();
    let spec = calibrator.calibrate("");
    let result =
        AsciiConverter::new().convert(&gradient(16, 16), &spec, &ConvertParams::default()).unwrap();
    assert!(result.text.is_empty());
    assert!(result.html.is_empty());
    assert!(result.cells.is_empty());
}

#[test]
fn raster_export_covers_every_cell() {
    let spec = CharsetSpec::uniform("#.");
    let params = ConvertParams::default().with_columns(10);
    let result = AsciiConverter::new().convert(&gradient(20, 20), &spec, &params).unwrap();
    let canvas = ascii_dither::render_cells(&result.cells, true);
    assert_eq!(canvas.width(), 10 * CELL_WIDTH);
    assert_eq!(canvas.height(), result.cells.rows * CELL_HEIGHT);
}
