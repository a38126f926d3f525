//! Floyd-Steinberg quantization of a brightness field onto a glyph ramp.
//!
//! Cells are visited in row-major order. Each cell snaps to the nearest ramp level and the
//! rounding error is pushed into neighbours that have not been visited yet:
//!
//! ```text
//!        X   7
//!    3   5   1
//! ```
//!
//! Every addition is clamped back into `[0, 1]` before the next one happens.

const EAST: f32 = 7.0 / 16.0;
const SOUTH_WEST: f32 = 3.0 / 16.0;
const SOUTH: f32 = 5.0 / 16.0;
const SOUTH_EAST: f32 = 1.0 / 16.0;

/// Index of the level closest to `value` in sorted `levels`, or 0 when there are none.
///
/// Values equidistant from two neighbouring levels resolve to the lower index.
pub(crate) fn nearest_level(levels: &[f32], value: f32) -> usize {
    let Some(last) = levels.len().checked_sub(1) else {
        return 0;
    };
    if value <= levels[0] {
        return 0;
    }
    if value >= levels[last] {
        return last;
    }

    let (mut lo, mut hi) = (0, last);
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if levels[mid] <= value {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    if value - levels[lo] <= levels[hi] - value {
        lo
    } else {
        hi
    }
}

/// Quantizes `brightness` in place and returns the chosen ramp index of every cell.
///
/// After the call `brightness` holds the level value each cell was snapped to.
pub fn quantize(brightness: &mut [f32], levels: &[f32], columns: usize, rows: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity(brightness.len());
    quantize_into(brightness, levels, columns, rows, &mut indices);
    indices
}

/// Same as [`quantize`], writing indices into a caller-owned buffer.
pub fn quantize_into(
    brightness: &mut [f32],
    levels: &[f32],
    columns: usize,
    rows: usize,
    indices: &mut Vec<usize>,
) {
    debug_assert_eq!(brightness.len(), columns * rows);

    indices.clear();
    indices.resize(brightness.len(), 0);

    match levels {
        [] => {
            brightness.fill(0.0);
            return;
        },
        [only] => {
            brightness.fill(*only);
            return;
        },
        _ => (),
    }

    for y in 0..rows {
        for x in 0..columns {
            let idx = y * columns + x;
            let original = brightness[idx];
            let level = nearest_level(levels, original);
            let chosen = levels[level];

            indices[idx] = level;
            brightness[idx] = chosen;

            let error = original - chosen;
            if error == 0.0 {
                continue;
            }

            if x + 1 < columns {
                diffuse(brightness, idx + 1, error * EAST);
            }

            if y + 1 < rows {
                let below = idx + columns;
                if x > 0 {
                    diffuse(brightness, below - 1, error * SOUTH_WEST);
                }
                diffuse(brightness, below, error * SOUTH);
                if x + 1 < columns {
                    diffuse(brightness, below + 1, error * SOUTH_EAST);
                }
            }
        }
    }
}

#[inline]
fn diffuse(brightness: &mut [f32], idx: usize, amount: f32) {
    brightness[idx] = (brightness[idx] + amount).clamp(0.0, 1.0);
}
