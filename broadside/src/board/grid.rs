//! Defines the types that make up the grid. These are shared between the
//! board's setup and playing versions.

use std::ops::{Index, IndexMut};

use enumflags2::BitFlags;
use serde::{Deserialize, Serialize};

use crate::{board::Coordinate, ships::ShipClass};

/// The terminal mark left on a cell by a resolved attack. A cell carries at
/// most one mark for the whole game; once marked it never resolves again.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ShotMark {
    Hit,
    Miss,
}

/// Auxiliary status flags a cell can carry alongside its attack outcome.
#[derive(BitFlags, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum CellStatus {
    /// The cell was exposed to the opposing side by a reconnaissance reveal.
    Revealed = 0b01,
}

/// A single cell in a player's grid.
#[derive(Debug)]
pub struct Cell {
    /// The class of the ship that occupies this cell, if any.
    pub(in crate::board) ship: Option<ShipClass>,

    /// The attack outcome recorded against this cell, if any.
    pub(in crate::board) shot: Option<ShotMark>,

    /// Display label of the action that resolved this cell.
    pub(in crate::board) label: Option<&'static str>,

    /// Status flags attached to this cell.
    pub(in crate::board) status: BitFlags<CellStatus>,
}

impl Cell {
    /// Whether an attack has already resolved against this cell.
    pub fn resolved(&self) -> bool {
        self.shot.is_some()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ship: None,
            shot: None,
            label: None,
            status: BitFlags::empty(),
        }
    }
}

/// Grid structure shared between [`BoardSetup`][crate::board::BoardSetup]
/// and [`Board`][crate::board::Board]. Cells are stored row-major.
#[derive(Debug)]
pub(in crate::board) struct Grid {
    /// Side length of the square grid.
    pub(in crate::board) size: usize,
    /// Cells that make up this grid.
    pub(in crate::board) cells: Box<[Cell]>,
}

impl Grid {
    pub(in crate::board) fn new(size: usize) -> Self {
        let cells = (0..size * size).map(|_| Cell::default()).collect();
        Self { size, cells }
    }

    /// Convert a coordinate to a linear index, or `None` if out of bounds.
    pub(in crate::board) fn try_linearize(&self, coord: Coordinate) -> Option<usize> {
        if coord.row < self.size && coord.col < self.size {
            Some(coord.row * self.size + coord.col)
        } else {
            None
        }
    }

    /// Get back a coordinate from a linearized index.
    pub(in crate::board) fn un_linearize(&self, idx: usize) -> Coordinate {
        Coordinate::new(idx / self.size, idx % self.size)
    }

    /// Get a reference to the cell at the given [`Coordinate`].
    pub(in crate::board) fn get(&self, coord: Coordinate) -> Option<&Cell> {
        self.try_linearize(coord).and_then(|i| self.cells.get(i))
    }

    /// Get a mutable reference to the cell at the given [`Coordinate`].
    pub(in crate::board) fn get_mut(&mut self, coord: Coordinate) -> Option<&mut Cell> {
        self.try_linearize(coord)
            .and_then(move |i| self.cells.get_mut(i))
    }
}

impl Index<Coordinate> for Grid {
    type Output = Cell;

    fn index(&self, coord: Coordinate) -> &Self::Output {
        self.get(coord).expect("coordinate out of bounds")
    }
}

impl IndexMut<Coordinate> for Grid {
    fn index_mut(&mut self, coord: Coordinate) -> &mut Self::Output {
        self.get_mut(coord).expect("coordinate out of bounds")
    }
}
