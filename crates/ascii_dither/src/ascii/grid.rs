/// One output glyph together with the source colour it was sampled from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Cell {
    pub fn new(ch: char, [r, g, b]: [u8; 3]) -> Self {
        Self { ch, r, g, b }
    }

    pub fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Row-major grid of cells.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellGrid {
    pub columns: u32,
    pub rows: u32,
    pub cells: Vec<Cell>,
}

impl CellGrid {
    pub fn new(columns: u32, rows: u32, cells: Vec<Cell>) -> Self {
        assert_eq!(columns as usize * rows as usize, cells.len());
        Self { columns, rows, cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, column: u32, row: u32) -> Option<&Cell> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells.get(row as usize * self.columns as usize + column as usize)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        // `chunks` panics on zero, and an empty grid has no rows anyway.
        let width = (self.columns as usize).max(1);
        self.cells.chunks(width)
    }

    pub fn text_rows(&self) -> impl Iterator<Item = String> + '_ {
        self.rows().map(|row| row.iter().map(|cell| cell.ch).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> CellGrid {
        let cells = "abcdef".chars().map(|ch| Cell::new(ch, [ch as u8, 0, 0])).collect();
        CellGrid::new(3, 2, cells)
    }

    #[test]
    fn text_rows_follow_row_major_order() {
        let rows: Vec<String> = grid().text_rows().collect();
        assert_eq!(rows, vec!["abc", "def"]);
    }

    #[test]
    fn get_checks_bounds() {
        let grid = grid();
        assert_eq!(grid.get(2, 1).map(|cell| cell.ch), Some('f'));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 2), None);
    }

    #[test]
    fn empty_grid_has_no_rows() {
        assert_eq!(CellGrid::default().rows().count(), 0);
    }
}
