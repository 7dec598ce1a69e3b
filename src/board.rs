//! Board: fixed grid of locked colour indices. rows[0] is the top.

use crate::piece::Piece;
use crate::vector::Vector;
use std::collections::VecDeque;

/// Empty cell value.
pub const EMPTY: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    rows: VecDeque<Vec<u8>>,
}

impl Board {
    pub fn new(height: usize, width: usize) -> Self {
        let rows = (0..height).map(|_| vec![EMPTY; width]).collect();
        Self {
            width,
            height,
            rows,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// True if `pos` lies inside the grid.
    #[inline]
    pub fn contains(&self, pos: Vector) -> bool {
        usize::try_from(pos.row).is_ok_and(|r| r < self.height)
            && usize::try_from(pos.col).is_ok_and(|c| c < self.width)
    }

    /// Cell value at `pos`. Callers check `contains` first.
    #[inline]
    pub fn cell_at(&self, pos: Vector) -> u8 {
        self.rows[pos.row as usize][pos.col as usize]
    }

    /// Write a cell; out-of-range positions are ignored.
    pub fn set(&mut self, pos: Vector, value: u8) {
        if self.contains(pos) {
            self.rows[pos.row as usize][pos.col as usize] = value;
        }
    }

    /// Commit the piece's colour into every cell it covers at `position`.
    pub fn lock(&mut self, piece: &Piece, position: Vector) {
        for cell in piece.cells(position) {
            self.set(cell, piece.color);
        }
    }

    pub fn is_row_full(row: &[u8]) -> bool {
        row.iter().all(|&c| c != EMPTY)
    }

    /// Drop every full row and refill from the top. Returns how many were removed.
    pub fn clear_full_rows(&mut self) -> usize {
        self.rows.retain(|row| !Self::is_row_full(row));
        let cleared = self.height - self.rows.len();
        for _ in 0..cleared {
            self.rows.push_front(vec![EMPTY; self.width]);
        }
        cleared
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Owned copy of the grid.
    pub fn to_grid(&self) -> Vec<Vec<u8>> {
        self.rows.iter().cloned().collect()
    }
}
