//! Square-ish grid geometry for the `Grid` arrangement.
//!
//! A grid holding `k` children uses `cols = ceil(sqrt(k))` columns and
//! `rows = ceil(k / cols)` rows, both floored at one. Children fill cells in
//! row-major order, so only the last row can have empty trailing cells.
//!
//! # Example
//! ```
//! use boxlayout::layout::grid::GridDims;
//!
//! let dims = GridDims::for_children(5);
//! assert_eq!((dims.cols, dims.rows), (3, 2));
//! assert_eq!(dims.cell_of(4), (1, 1));
//! ```

use serde::Serialize;

/// Column/row counts of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridDims {
    pub cols: usize,
    pub rows: usize,
}

impl GridDims {
    pub fn for_children(count: usize) -> Self {
        let cols = ((count as f64).sqrt().ceil() as usize).max(1);
        let rows = count.div_ceil(cols).max(1);
        Self { cols, rows }
    }

    /// `(row, col)` of the child at linear `index`.
    pub fn cell_of(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    pub fn capacity(&self) -> usize {
        self.cols * self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_grid_still_has_one_cell() {
        let dims = GridDims::for_children(0);
        assert_eq!(dims, GridDims { cols: 1, rows: 1 });
    }

    #[test]
    fn perfect_squares() {
        assert_eq!(GridDims::for_children(4), GridDims { cols: 2, rows: 2 });
        assert_eq!(GridDims::for_children(9), GridDims { cols: 3, rows: 3 });
    }

    #[test]
    fn every_child_gets_exactly_one_cell() {
        for k in 1..200 {
            let dims = GridDims::for_children(k);
            assert!(dims.capacity() >= k, "k={k}");
            assert!(dims.cols * (dims.rows - 1) < k, "k={k}");
            assert!(dims.capacity() - k < dims.cols, "k={k}");
        }
    }

    #[test]
    fn cells_are_row_major() {
        let dims = GridDims::for_children(7);
        assert_eq!(dims.cols, 3);
        assert_eq!(dims.cell_of(0), (0, 0));
        assert_eq!(dims.cell_of(2), (0, 2));
        assert_eq!(dims.cell_of(3), (1, 0));
        assert_eq!(dims.cell_of(6), (2, 0));
    }
}
