use image::imageops::{self, FilterType};
use image::RgbaImage;

use super::loader::{DecodedImage, ImageMeta};
use crate::AsciiError;

/// Assumed height / width ratio of a monospaced character cell.
pub const CHAR_ASPECT: f32 = 2.0;

/// Filter used when scaling the source down to the cell grid.
const SAMPLE_FILTER: FilterType = FilterType::Triangle;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetGeometry {
    pub columns: u32,
    pub rows: u32,
    pub cell_aspect: f32,
}

impl TargetGeometry {
    /// Grid of `columns` cells whose rendered shape tracks the source aspect ratio.
    pub fn for_columns(meta: ImageMeta, columns: u32) -> Result<Self, AsciiError> {
        if meta.width == 0 || meta.height == 0 {
            return Err(AsciiError::InvalidDimensions { width: meta.width, height: meta.height });
        }
        if columns == 0 {
            return Err(AsciiError::InvalidColumns);
        }

        let image_ratio = f64::from(meta.height) / f64::from(meta.width);
        let rows = (image_ratio * (f64::from(columns) / f64::from(CHAR_ASPECT))).round();
        let rows = rows.clamp(1.0, f64::from(u32::MAX)) as u32;

        Ok(Self { columns, rows, cell_aspect: CHAR_ASPECT })
    }

    pub fn cell_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }
}

/// Source pixels resampled to one RGBA value per output cell, row-major.
#[derive(Clone, Debug)]
pub struct SampleGrid {
    image: RgbaImage,
}

impl SampleGrid {
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn columns(&self) -> u32 {
        self.image.width()
    }

    pub fn rows(&self) -> u32 {
        self.image.height()
    }

    pub fn len(&self) -> usize {
        self.columns() as usize * self.rows() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.image.pixels().map(|pixel| pixel.0)
    }

    pub fn pixel(&self, column: u32, row: u32) -> [u8; 4] {
        self.image.get_pixel(column, row).0
    }
}

/// Resamples `image` onto a grid `columns` cells wide.
pub fn sample(
    image: &DecodedImage,
    columns: u32,
) -> Result<(SampleGrid, TargetGeometry), AsciiError> {
    let geometry = TargetGeometry::for_columns(image.meta(), columns)?;
    let source = image.pixels();

    let resized = if source.dimensions() == (geometry.columns, geometry.rows) {
        source.clone()
    } else {
        imageops::resize(source, geometry.columns, geometry.rows, SAMPLE_FILTER)
    };

    Ok((SampleGrid::from_rgba(resized), geometry))
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    fn meta(width: u32, height: u32) -> ImageMeta {
        ImageMeta { width, height }
    }

    #[test]
    fn rows_follow_aspect_and_cell_shape() {
        let geometry = TargetGeometry::for_columns(meta(200, 100), 120).unwrap();
        assert_eq!((geometry.columns, geometry.rows), (120, 30));
    }

    #[test]
    fn rows_never_drop_below_one() {
        let geometry = TargetGeometry::for_columns(meta(1000, 1), 4).unwrap();
        assert_eq!(geometry.rows, 1);
    }

    #[test]
    fn rows_round_half_up() {
        // 10/4 * 3/2 = 3.75
        assert_eq!(TargetGeometry::for_columns(meta(4, 10), 3).unwrap().rows, 4);
        // 1/4 * 10/2 = 1.25
        assert_eq!(TargetGeometry::for_columns(meta(4, 1), 10).unwrap().rows, 1);
        // 1/1 * 5/2 = 2.5
        assert_eq!(TargetGeometry::for_columns(meta(1, 1), 5).unwrap().rows, 3);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let err = TargetGeometry::for_columns(meta(0, 10), 10).unwrap_err();
        assert!(matches!(err, AsciiError::InvalidDimensions { width: 0, height: 10 }));
    }

    #[test]
    fn zero_columns_are_rejected() {
        let err = TargetGeometry::for_columns(meta(10, 10), 0).unwrap_err();
        assert!(matches!(err, AsciiError::InvalidColumns));
    }

    #[test]
    fn sample_produces_target_grid() {
        let source = RgbaImage::from_pixel(64, 32, Rgba([10, 20, 30, 255]));
        let image = DecodedImage::from_rgba(source);
        let (grid, geometry) = sample(&image, 16).unwrap();
        assert_eq!((grid.columns(), grid.rows()), (16, 4));
        assert_eq!(grid.len(), geometry.cell_count());
        assert!(grid.pixels().all(|pixel| pixel == [10, 20, 30, 255]));
    }

    #[test]
    fn sample_keeps_left_right_order() {
        let mut source = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));
        for y in 0..8 {
            for x in 4..8 {
                source.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }

        let (grid, _) = sample(&DecodedImage::from_rgba(source), 2).unwrap();
        assert!(grid.pixel(0, 0)[0] < 128);
        assert!(grid.pixel(1, 0)[0] > 128);
    }
}
