//! Vector: (row, col) offset used for board positions and piece-local blocks.

use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Integer 2D offset. `row` grows downward, `col` grows to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vector {
    pub row: i32,
    pub col: i32,
}

impl Vector {
    pub const DOWN: Self = Self::new(1, 0);
    pub const LEFT: Self = Self::new(0, -1);
    pub const RIGHT: Self = Self::new(0, 1);

    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl Add for Vector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.row + rhs.row, self.col + rhs.col)
    }
}

impl Sub for Vector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.row - rhs.row, self.col - rhs.col)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Self) {
        self.row += rhs.row;
        self.col += rhs.col;
    }
}

impl SubAssign for Vector {
    fn sub_assign(&mut self, rhs: Self) {
        self.row -= rhs.row;
        self.col -= rhs.col;
    }
}

impl From<(i32, i32)> for Vector {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}
