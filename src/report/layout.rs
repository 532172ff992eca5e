//! Subplot grid placement

use serde::Serialize;

/// Position of a panel in the grid (0-indexed)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub row: usize,
    pub column: usize,
}

/// Row-major grid holding one panel per iteration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GridLayout {
    pub num_rows: usize,
    pub num_columns: usize,
}

impl GridLayout {
    /// Lay `panels` out on `num_columns` columns (at least one)
    pub fn new(panels: usize, num_columns: usize) -> Self {
        let num_columns = num_columns.max(1);
        Self {
            num_rows: panels.div_ceil(num_columns),
            num_columns,
        }
    }

    /// Cell of the panel at `position` in iteration order
    pub fn cell(&self, position: usize) -> GridCell {
        GridCell {
            row: position / self.num_columns,
            column: position % self.num_columns,
        }
    }

    /// Number of cells in the grid
    pub fn capacity(&self) -> usize {
        self.num_rows * self.num_columns
    }
}
