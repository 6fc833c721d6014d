//! Payline coordinate sets

use serde::{Deserialize, Serialize};

/// A payline: one row position per reel, read left to right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payline {
    /// Payline index (0-based)
    pub index: u8,
    /// Row position for each reel (length == reel count)
    pub rows: Vec<u8>,
}

impl Payline {
    /// Create a straight line on one row across all reels.
    pub fn straight(index: u8, row: u8, reel_count: u8) -> Self {
        Self {
            index,
            rows: vec![row; reel_count as usize],
        }
    }

    /// Number of reels the line spans.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Coordinate at a reel position.
    pub fn coord(&self, reel: usize) -> Option<(u8, u8)> {
        self.rows.get(reel).map(|&row| (reel as u8, row))
    }

    /// Iterate `(reel, row)` coordinates left to right.
    pub fn coords(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .map(|(reel, &row)| (reel as u8, row))
    }
}

/// The classic 9-line pattern set for a 5×3 grid.
pub fn standard_9_paylines() -> Vec<Payline> {
    vec![
        // Straight lines
        Payline::straight(0, 1, 5),
        Payline::straight(1, 0, 5),
        Payline::straight(2, 2, 5),
        // V shapes
        Payline { index: 3, rows: vec![0, 1, 2, 1, 0] },
        Payline { index: 4, rows: vec![2, 1, 0, 1, 2] },
        // Zigzag
        Payline { index: 5, rows: vec![0, 0, 1, 2, 2] },
        Payline { index: 6, rows: vec![2, 2, 1, 0, 0] },
        Payline { index: 7, rows: vec![1, 0, 0, 0, 1] },
        Payline { index: 8, rows: vec![1, 2, 2, 2, 1] },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_line() {
        let line = Payline::straight(0, 1, 5);
        assert_eq!(line.rows, vec![1, 1, 1, 1, 1]);
        assert_eq!(line.coord(2), Some((2, 1)));
        assert_eq!(line.coord(5), None);
    }

    #[test]
    fn test_standard_lines_span_all_reels() {
        for line in standard_9_paylines() {
            assert_eq!(line.len(), 5);
            assert!(line.rows.iter().all(|&r| r < 3));
        }
    }

    #[test]
    fn test_coords_start_at_reel_zero() {
        let line = Payline { index: 3, rows: vec![0, 1, 2, 1, 0] };
        let coords: Vec<_> = line.coords().collect();
        assert_eq!(coords[0], (0, 0));
        assert_eq!(coords[4], (4, 0));
    }
}
