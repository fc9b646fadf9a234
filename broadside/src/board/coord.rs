use std::fmt;

use serde::{Deserialize, Serialize};

/// The position of a [`Cell`][crate::board::Cell] in a board, as a
/// `(row, col)` pair counted from the top-left corner. Coordinates are
/// disposable and cheap to copy.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    /// Vertical position of the cell, counting down from 0.
    pub row: usize,
    /// Horizontal position of the cell, counting right from 0.
    pub col: usize,
}

impl Coordinate {
    /// Construct a [`Coordinate`] from the given `row` and `col`.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Offset this coordinate by a signed `(row, col)` delta. Returns `None`
    /// if either component would underflow; overflow past the board edge is
    /// left for the board's own bounds check.
    pub fn offset(self, dr: isize, dc: isize) -> Option<Self> {
        Some(Self {
            row: add_signed(self.row, dr)?,
            col: add_signed(self.col, dc)?,
        })
    }

    /// The up-to-four orthogonal neighbors of this coordinate, unchecked
    /// against any upper bound.
    pub fn orthogonal(self) -> impl Iterator<Item = Coordinate> {
        ORTHOGONAL
            .iter()
            .filter_map(move |&(dr, dc)| self.offset(dr, dc))
    }

    /// The up-to-four diagonal neighbors of this coordinate, unchecked
    /// against any upper bound.
    pub fn diagonal(self) -> impl Iterator<Item = Coordinate> {
        DIAGONAL
            .iter()
            .filter_map(move |&(dr, dc)| self.offset(dr, dc))
    }
}

static ORTHOGONAL: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
static DIAGONAL: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

fn add_signed(base: usize, delta: isize) -> Option<usize> {
    if delta < 0 {
        base.checked_sub(delta.unsigned_abs())
    } else {
        base.checked_add(delta as usize)
    }
}

impl From<(usize, usize)> for Coordinate {
    /// Construct a [`Coordinate`] from the given `(row, col)` pair.
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// One quarter of a board. For odd board sizes the center row and column
/// belong to the south and east halves respectively.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Quadrant {
    /// Every quadrant, in reading order.
    pub const ALL: &'static [Quadrant] = &[
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    /// Iterate the coordinates of this quadrant on a board of the given side
    /// length.
    pub fn cells(self, size: usize) -> impl Iterator<Item = Coordinate> {
        let half = size / 2;
        let (rows, cols) = match self {
            Quadrant::NorthWest => (0..half, 0..half),
            Quadrant::NorthEast => (0..half, half..size),
            Quadrant::SouthWest => (half..size, 0..half),
            Quadrant::SouthEast => (half..size, half..size),
        };
        rows.flat_map(move |row| cols.clone().map(move |col| Coordinate::new(row, col)))
    }
}
