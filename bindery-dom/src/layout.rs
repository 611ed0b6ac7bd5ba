use std::num::IntErrorKind;

use crate::toolkit::{Options, ToolkitError};

/// Largest row, column or span a grid option may name.
pub const MAX_GRID_INDEX: usize = 10_000;

/// A grid cell span: first column/row and how many it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub column: usize,
    pub row: usize,
    pub columnspan: usize,
    pub rowspan: usize,
}

fn parse_index(options: &Options, option: &str, default: usize) -> Result<usize, ToolkitError> {
    let Some(raw) = options.get(option) else {
        return Ok(default);
    };
    let out_of_range = || ToolkitError::GridIndex {
        option: option.to_string(),
        value: raw.clone(),
    };
    match raw.trim().parse::<usize>() {
        Ok(n) if n > MAX_GRID_INDEX => Err(out_of_range()),
        Ok(n) => Ok(n),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Err(out_of_range()),
        Err(_) => Ok(default),
    }
}

impl Cell {
    /// Read `column`, `row`, `columnspan` and `rowspan` from grid options.
    /// Missing or unparseable values fall back to cell (0, 0) spanning one;
    /// values above [`MAX_GRID_INDEX`] are rejected.
    pub fn from_options(options: &Options) -> Result<Self, ToolkitError> {
        Ok(Cell {
            column: parse_index(options, "column", 0)?,
            row: parse_index(options, "row", 0)?,
            columnspan: parse_index(options, "columnspan", 1)?.max(1),
            rowspan: parse_index(options, "rowspan", 1)?.max(1),
        })
    }

    /// One past the last column and row covered.
    pub fn extent(&self) -> (usize, usize) {
        (
            self.column.saturating_add(self.columnspan),
            self.row.saturating_add(self.rowspan),
        )
    }
}

/// Columns and rows needed to hold every cell. Cells with out-of-range
/// options are skipped.
pub fn grid_extent<'a>(cells: impl IntoIterator<Item = &'a Options>) -> (usize, usize) {
    cells
        .into_iter()
        .filter_map(|o| Cell::from_options(o).ok())
        .map(|cell| cell.extent())
        .fold((0, 0), |(c, r), (c2, r2)| (c.max(c2), r.max(r2)))
}
