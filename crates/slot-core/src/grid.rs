//! Symbol grid — one spin's visible result

use serde::{Deserialize, Serialize};

/// Symbol identifier. `0` is reserved for the empty cell.
pub type SymbolId = u32;

/// The empty/absent cell marker.
pub const EMPTY: SymbolId = 0;

/// A reels × rows matrix of symbol ids, reel-major, row-minor.
///
/// A constructed grid always has exactly `reels` columns of exactly `rows`
/// cells. Out-of-bounds reads return `None` rather than panicking, so the
/// evaluator can treat malformed coordinates as absent symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    columns: Vec<Vec<SymbolId>>,
}

impl Grid {
    /// Create a grid with every cell set to [`EMPTY`].
    pub fn empty(reels: u8, rows: u8) -> Self {
        Self {
            columns: vec![vec![EMPTY; rows as usize]; reels as usize],
        }
    }

    /// Create a grid with every cell set to `symbol`.
    pub fn filled(reels: u8, rows: u8, symbol: SymbolId) -> Self {
        Self {
            columns: vec![vec![symbol; rows as usize]; reels as usize],
        }
    }

    /// Number of reels (columns).
    pub fn reels(&self) -> u8 {
        self.columns.len() as u8
    }

    /// Number of rows per reel.
    pub fn rows(&self) -> u8 {
        self.columns.first().map(|c| c.len()).unwrap_or(0) as u8
    }

    /// Symbol at (reel, row), or `None` when the coordinate is out of bounds.
    pub fn get(&self, reel: u8, row: u8) -> Option<SymbolId> {
        self.columns
            .get(reel as usize)
            .and_then(|c| c.get(row as usize))
            .copied()
    }

    /// Set the symbol at (reel, row). Out-of-bounds writes are ignored.
    pub fn set(&mut self, reel: u8, row: u8, symbol: SymbolId) {
        if let Some(cell) = self
            .columns
            .get_mut(reel as usize)
            .and_then(|c| c.get_mut(row as usize))
        {
            *cell = symbol;
        }
    }

    /// Borrow one reel column.
    pub fn column(&self, reel: u8) -> Option<&[SymbolId]> {
        self.columns.get(reel as usize).map(|c| c.as_slice())
    }

    /// Mutably borrow one reel column.
    pub fn column_mut(&mut self, reel: u8) -> Option<&mut [SymbolId]> {
        self.columns.get_mut(reel as usize).map(|c| c.as_mut_slice())
    }

    /// Iterate all cells as `(reel, row, symbol)`.
    pub fn cells(&self) -> impl Iterator<Item = (u8, u8, SymbolId)> + '_ {
        self.columns.iter().enumerate().flat_map(|(reel, col)| {
            col.iter()
                .enumerate()
                .map(move |(row, &s)| (reel as u8, row as u8, s))
        })
    }

    /// Count occurrences of `symbol` anywhere on the grid.
    pub fn count(&self, symbol: SymbolId) -> u8 {
        self.cells().filter(|&(_, _, s)| s == symbol).count() as u8
    }

    /// All positions holding `symbol`, in reel-major order.
    pub fn positions(&self, symbol: SymbolId) -> Vec<(u8, u8)> {
        self.cells()
            .filter(|&(_, _, s)| s == symbol)
            .map(|(reel, row, _)| (reel, row))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_shape() {
        let grid = Grid::empty(5, 3);
        assert_eq!(grid.reels(), 5);
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cells().count(), 15);
    }

    #[test]
    fn test_out_of_bounds_reads() {
        let grid = Grid::filled(5, 3, 7);
        assert_eq!(grid.get(2, 1), Some(7));
        assert_eq!(grid.get(5, 0), None);
        assert_eq!(grid.get(0, 3), None);
    }

    #[test]
    fn test_column_access() {
        let mut grid = Grid::filled(5, 3, 4);
        assert_eq!(grid.column(1), Some([4, 4, 4].as_slice()));
        if let Some(column) = grid.column_mut(2) {
            column[1] = 9;
        }
        assert_eq!(grid.get(2, 1), Some(9));
        assert!(grid.column(5).is_none());
        assert!(grid.column_mut(5).is_none());
    }

    #[test]
    fn test_set_and_count() {
        let mut grid = Grid::empty(5, 3);
        grid.set(0, 1, 9);
        grid.set(3, 2, 9);
        grid.set(9, 9, 9); // ignored
        assert_eq!(grid.count(9), 2);
        assert_eq!(grid.positions(9), vec![(0, 1), (3, 2)]);
    }
}
