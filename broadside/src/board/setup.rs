//! Implements the setup phase of the board.

use std::collections::HashMap;

use crate::{
    board::{
        errors::{CannotPlaceReason, PlaceError},
        grid::Grid,
        Board, Coordinate, ShipRecord,
    },
    ships::{fleet_for, FleetPlacement, ShipClass, ShipSpot},
};

/// Setup phase for a [`Board`]. Registers the fleet for the board's size and
/// allows placing ships; shooting is only possible after [`start`][Self::start].
///
/// Placement enforces bounds, overlap, and a one-cell buffer between ships:
/// no two ships may occupy cells that touch, even diagonally.
pub struct BoardSetup {
    /// Grid the ships are placed into.
    grid: Grid,

    /// Mapping of fleet ships to their placed cells, if placed.
    ships: HashMap<ShipClass, Option<Vec<Coordinate>>>,
}

impl BoardSetup {
    /// Begin setup of a square board with the given side length. The fleet is
    /// derived from the board size.
    pub fn new(size: usize) -> Self {
        Self {
            grid: Grid::new(size),
            ships: fleet_for(size).iter().map(|&class| (class, None)).collect(),
        }
    }

    /// Build a setup board and apply a complete placement plan to it.
    pub fn with_plan(size: usize, plan: &FleetPlacement) -> Result<Self, PlaceError> {
        let mut setup = Self::new(size);
        for spot in &plan.ships {
            setup.place(*spot)?;
        }
        Ok(setup)
    }

    /// Side length of the board being set up.
    pub fn size(&self) -> usize {
        self.grid.size
    }

    /// The ship occupying the given cell, if any. Used by setup displays.
    pub fn ship_at(&self, coord: Coordinate) -> Option<ShipClass> {
        self.grid.get(coord).and_then(|cell| cell.ship)
    }

    /// The cells the given ship is placed on, if it has been placed.
    pub fn placement(&self, class: ShipClass) -> Option<&[Coordinate]> {
        self.ships.get(&class)?.as_deref()
    }

    /// Get an iterator over the fleet ships which still need to be placed.
    pub fn pending_ships(&self) -> impl Iterator<Item = ShipClass> + '_ {
        self.ships
            .iter()
            .filter_map(|(&class, placed)| if placed.is_none() { Some(class) } else { None })
    }

    /// Checks if this board is ready to start: every fleet ship placed.
    pub fn ready(&self) -> bool {
        self.ships.values().all(|placed| placed.is_some())
    }

    /// Attempts to place a ship at the given spot. On failure nothing is
    /// changed and the reason is reported.
    pub fn place(&mut self, spot: ShipSpot) -> Result<(), PlaceError> {
        match self.ships.get(&spot.class) {
            None => return Err(PlaceError::new(CannotPlaceReason::NotInFleet, spot.class)),
            Some(Some(_)) => {
                return Err(PlaceError::new(CannotPlaceReason::AlreadyPlaced, spot.class))
            }
            Some(None) => {}
        }
        let cells: Vec<Coordinate> = spot.cells().collect();
        for &coord in &cells {
            match self.grid.get(coord) {
                None => return Err(PlaceError::new(CannotPlaceReason::OutOfBounds, spot.class)),
                Some(cell) if cell.ship.is_some() => {
                    return Err(PlaceError::new(
                        CannotPlaceReason::AlreadyOccupied,
                        spot.class,
                    ))
                }
                Some(_) => {}
            }
            if !self.buffer_clear(coord) {
                return Err(PlaceError::new(CannotPlaceReason::TooClose, spot.class));
            }
        }
        // Every cell is in bounds, free, and buffered.
        for &coord in &cells {
            self.grid[coord].ship = Some(spot.class);
        }
        self.ships.insert(spot.class, Some(cells));
        Ok(())
    }

    /// Clear the placement of the given ship. Returns `true` if the ship was
    /// previously placed.
    pub fn unplace(&mut self, class: ShipClass) -> bool {
        match self.ships.get_mut(&class).and_then(Option::take) {
            Some(cells) => {
                for coord in cells {
                    self.grid[coord].ship = None;
                }
                true
            }
            None => false,
        }
    }

    /// Tries to start the game. If every fleet ship is placed, returns a
    /// [`Board`] with the current placements, otherwise returns `self`.
    pub fn start(self) -> Result<Board, Self> {
        if !self.ready() {
            return Err(self);
        }
        let ships = self
            .ships
            .iter()
            .map(|(&class, placed)| {
                let cells = placed.clone().expect("ready board had unplaced ship");
                (class, ShipRecord { cells, hits: 0 })
            })
            .collect();
        Ok(Board::from_parts(self.grid, ships))
    }

    /// True if no already-placed ship occupies the cell or any of its eight
    /// neighbors.
    fn buffer_clear(&self, coord: Coordinate) -> bool {
        if self.grid[coord].ship.is_some() {
            return false;
        }
        coord
            .orthogonal()
            .chain(coord.diagonal())
            .all(|n| match self.grid.get(n) {
                Some(cell) => cell.ship.is_none(),
                None => true,
            })
    }
}
