use std::fmt::Write as _;

use super::grid::{Cell, CellGrid};
use crate::image_pipeline::adjust::relative_luminance;
use crate::image_pipeline::resize::SampleGrid;
use crate::ConversionResult;

/// Backgrounds brighter than this get black text, everything else white.
const CONTRAST_THRESHOLD: f32 = 0.6;

const BLACK: [u8; 3] = [0, 0, 0];
const WHITE: [u8; 3] = [255, 255, 255];

/// Text colour that stays readable on a cell filled with `rgb`.
pub fn contrast_foreground([r, g, b]: [u8; 3]) -> [u8; 3] {
    if relative_luminance(r, g, b) > CONTRAST_THRESHOLD {
        BLACK
    } else {
        WHITE
    }
}

/// Escapes the characters that are significant inside HTML text and attributes.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        push_escaped(&mut escaped, ch);
    }
    escaped
}

fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(ch),
    }
}

/// Builds every output representation from sampled colours and quantized ramp indices.
///
/// Colours always come from `samples`, so they reflect the source pixel rather than the
/// dithered brightness.
pub fn assemble(
    samples: &SampleGrid,
    indices: &[usize],
    ramp: &[char],
    colorize: bool,
) -> ConversionResult {
    debug_assert_eq!(samples.len(), indices.len());

    if ramp.is_empty() {
        return ConversionResult::empty();
    }

    let columns = samples.columns();
    let rows = samples.rows();
    let last = ramp.len().saturating_sub(1);

    let cells: Vec<Cell> = samples
        .pixels()
        .zip(indices)
        .map(|([r, g, b, _], &index)| Cell::new(ramp[index.min(last)], [r, g, b]))
        .collect();
    let grid = CellGrid::new(columns, rows, cells);

    let text = grid.text_rows().collect::<Vec<_>>().join("\n");
    let html = if colorize { colored_html(&grid) } else { String::new() };

    ConversionResult { text, html, cells: grid }
}

fn colored_html(grid: &CellGrid) -> String {
    // Roughly 70 bytes of markup per cell.
    let mut html = String::with_capacity(grid.len() * 70);

    for (row_index, row) in grid.rows().enumerate() {
        if row_index > 0 {
            html.push('\n');
        }

        for cell in row {
            let [r, g, b] = cell.rgb();
            let [fr, fg, fb] = contrast_foreground(cell.rgb());
            let _ = write!(
                html,
                "<span style=\"background-color:rgb({r},{g},{b});color:rgb({fr},{fg},{fb})\">"
            );
            if cell.ch == ' ' {
                html.push_str("&nbsp;");
            } else {
                push_escaped(&mut html, cell.ch);
            }
            html.push_str("</span>");
        }
    }

    html
}
