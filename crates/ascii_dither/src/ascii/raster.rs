//! Draws a cell grid back into pixels, one bitmap glyph per cell.

use std::path::Path;

use image::{Rgba, RgbaImage};

use super::assemble::contrast_foreground;
use super::grid::CellGrid;
use super::surface::{bitmap_glyph, BITMAP_GLYPH_SIZE};
use crate::AsciiError;

pub const CELL_WIDTH: u32 = BITMAP_GLYPH_SIZE;
/// Twice the width, matching the assumed character cell aspect.
pub const CELL_HEIGHT: u32 = BITMAP_GLYPH_SIZE * 2;

const PAPER: [u8; 3] = [255, 255, 255];
const INK: [u8; 3] = [0, 0, 0];

/// Renders `grid` to an image `CELL_WIDTH * columns` by `CELL_HEIGHT * rows` pixels.
///
/// With `colorize` each cell is filled with its source colour and drawn in a contrasting
/// colour; otherwise glyphs are black on white.
pub fn render_cells(grid: &CellGrid, colorize: bool) -> RgbaImage {
    let mut canvas = RgbaImage::new(grid.columns * CELL_WIDTH, grid.rows * CELL_HEIGHT);
    let vertical_scale = CELL_HEIGHT / BITMAP_GLYPH_SIZE;

    for (row_index, row) in grid.rows().enumerate() {
        let top = row_index as u32 * CELL_HEIGHT;

        for (column_index, cell) in row.iter().enumerate() {
            let left = column_index as u32 * CELL_WIDTH;
            let (background, foreground) = if colorize {
                (cell.rgb(), contrast_foreground(cell.rgb()))
            } else {
                (PAPER, INK)
            };

            let glyph = bitmap_glyph(cell.ch).unwrap_or([0; 8]);
            for y in 0..CELL_HEIGHT {
                let bits = glyph[(y / vertical_scale) as usize];
                for x in 0..CELL_WIDTH {
                    let [r, g, b] = if (bits >> x) & 1 == 1 { foreground } else { background };
                    canvas.put_pixel(left + x, top + y, Rgba([r, g, b, 255]));
                }
            }
        }
    }

    canvas
}

/// Renders `grid` and writes it to `path`, the format following the file extension.
pub fn save_cells<P: AsRef<Path>>(
    grid: &CellGrid,
    colorize: bool,
    path: P,
) -> Result<(), AsciiError> {
    render_cells(grid, colorize).save(path.as_ref()).map_err(AsciiError::Export)
}
