//! Types that make up the game board.

use std::collections::HashMap;

use rand::{seq::SliceRandom, Rng};

use crate::ships::ShipClass;

use self::grid::Grid;
pub use self::{
    coord::{Coordinate, Quadrant},
    errors::{CannotPlaceReason, CannotShootReason, PlaceError, ShotError},
    grid::{Cell, CellStatus, ShotMark},
    setup::BoardSetup,
};

mod coord;
mod errors;
mod grid;
mod setup;

/// Per-ship bookkeeping: the cells a ship occupies and how many of them have
/// been hit. Kept alongside the grid so abilities can query remaining health
/// without rescanning cells.
#[derive(Debug, Clone)]
pub(crate) struct ShipRecord {
    pub(crate) cells: Vec<Coordinate>,
    pub(crate) hits: usize,
}

/// Handle to a ship that allows getting information about its status.
#[derive(Debug, Copy, Clone)]
pub struct ShipRef<'a> {
    class: ShipClass,
    record: &'a ShipRecord,
}

impl<'a> ShipRef<'a> {
    /// The class of this ship.
    pub fn class(&self) -> ShipClass {
        self.class
    }

    /// Number of cells of this ship that have been hit.
    pub fn hits(&self) -> usize {
        self.record.hits
    }

    /// Total length of this ship.
    pub fn len(&self) -> usize {
        self.record.cells.len()
    }

    /// Check if this ship has been sunk.
    pub fn sunk(&self) -> bool {
        self.record.hits == self.record.cells.len()
    }

    /// Get an iterator over the coordinates of this ship.
    pub fn coords(&self) -> impl Iterator<Item = Coordinate> + 'a {
        self.record.cells.iter().copied()
    }
}

/// Reference to a particular cell in the grid.
#[derive(Debug, Copy, Clone)]
pub struct CellRef<'a> {
    coord: Coordinate,
    cell: &'a Cell,
}

impl<'a> CellRef<'a> {
    /// The grid coordinate of this cell.
    pub fn coord(&self) -> Coordinate {
        self.coord
    }

    /// The attack outcome recorded against this cell, if any.
    pub fn mark(&self) -> Option<ShotMark> {
        self.cell.shot
    }

    /// Whether an attack has already resolved against this cell.
    pub fn resolved(&self) -> bool {
        self.cell.resolved()
    }

    /// The class of the ship occupying this cell, if any.
    pub fn ship(&self) -> Option<ShipClass> {
        self.cell.ship
    }

    /// Display label of the action that resolved this cell.
    pub fn label(&self) -> Option<&'static str> {
        self.cell.label
    }

    /// Whether this cell was exposed by a reconnaissance reveal.
    pub fn revealed(&self) -> bool {
        self.cell.status.contains(CellStatus::Revealed)
    }
}

/// Result of one shot resolved against a single cell.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShotResult {
    /// The shot did not hit anything.
    Miss,
    /// The shot hit the given ship without sinking it.
    Hit(ShipClass),
    /// The shot hit the given ship and sank it.
    Sunk(ShipClass),
}

impl ShotResult {
    /// Get the class of the ship that was hit, if any.
    pub fn ship(&self) -> Option<ShipClass> {
        match self {
            ShotResult::Miss => None,
            ShotResult::Hit(class) | ShotResult::Sunk(class) => Some(*class),
        }
    }

    /// Whether the shot struck a ship.
    pub fn is_hit(&self) -> bool {
        !matches!(self, ShotResult::Miss)
    }
}

/// Represents a single player's board: their grid of cells and the fleet
/// placed on it. Immutable after setup except for attack-driven mutation.
#[derive(Debug)]
pub struct Board {
    /// Grid of cells occupied by ships.
    grid: Grid,

    /// Bookkeeping for every ship on this board.
    ships: HashMap<ShipClass, ShipRecord>,
}

impl Board {
    fn from_parts(grid: Grid, ships: HashMap<ShipClass, ShipRecord>) -> Self {
        Self { grid, ships }
    }

    /// Side length of this board.
    pub fn size(&self) -> usize {
        self.grid.size
    }

    /// Returns true if every ship on this board has been sunk.
    pub fn defeated(&self) -> bool {
        self.iter_ships().all(|ship| ship.sunk())
    }

    /// Get an iterator over all ships on this board.
    pub fn iter_ships(&self) -> impl Iterator<Item = ShipRef> {
        self.ships
            .iter()
            .map(|(&class, record)| ShipRef { class, record })
    }

    /// Get the ship of the given class if this board's fleet contains it.
    pub fn ship(&self, class: ShipClass) -> Option<ShipRef> {
        self.ships
            .get(&class)
            .map(|record| ShipRef { class, record })
    }

    /// Get a reference to the cell at the given coordinate. Returns `None` if
    /// the coordinate is out of bounds.
    pub fn cell(&self, coord: Coordinate) -> Option<CellRef> {
        self.grid.get(coord).map(|cell| CellRef { coord, cell })
    }

    /// Iterate the rows of this board. Each row is an iterator over the
    /// coordinates of that row.
    pub fn iter_coordinates(
        &self,
    ) -> impl Iterator<Item = impl Iterator<Item = Coordinate>> {
        let size = self.grid.size;
        (0..size).map(move |row| (0..size).map(move |col| Coordinate::new(row, col)))
    }

    /// Resolve one shot against this board, recording the display label of
    /// the action that fired it. Fails without mutation if the coordinate is
    /// out of bounds or the cell was already resolved.
    pub(crate) fn resolve(
        &mut self,
        coord: Coordinate,
        label: &'static str,
    ) -> Result<ShotResult, ShotError> {
        let cell = match self.grid.get_mut(coord) {
            None => return Err(ShotError::new(CannotShootReason::OutOfBounds, coord)),
            Some(cell) if cell.resolved() => {
                return Err(ShotError::new(CannotShootReason::AlreadyResolved, coord))
            }
            Some(cell) => cell,
        };
        let struck = cell.ship;
        cell.shot = Some(if struck.is_some() {
            ShotMark::Hit
        } else {
            ShotMark::Miss
        });
        cell.label = Some(label);
        Ok(match struck {
            None => ShotResult::Miss,
            Some(class) => {
                let record = self
                    .ships
                    .get_mut(&class)
                    .expect("grid cell referenced a ship missing from the fleet");
                record.hits += 1;
                if record.hits == record.cells.len() {
                    ShotResult::Sunk(class)
                } else {
                    ShotResult::Hit(class)
                }
            }
        })
    }

    /// Flag the given cell as revealed to the opposing side.
    pub(crate) fn mark_revealed(&mut self, coord: Coordinate) {
        if let Some(cell) = self.grid.get_mut(coord) {
            cell.status |= CellStatus::Revealed;
        }
    }

    /// Pick a uniformly random ship-occupied cell that has not been resolved
    /// yet. Returns `None` if no such cell exists.
    pub(crate) fn random_intact_ship_cell(&self, rng: &mut impl Rng) -> Option<Coordinate> {
        let candidates: Vec<Coordinate> = self
            .grid
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.ship.is_some() && !cell.resolved())
            .map(|(i, _)| self.grid.un_linearize(i))
            .collect();
        candidates.choose(rng).copied()
    }

    /// Count the ship-occupied cells inside the 2x2 block anchored at the
    /// given cell, clipped to the board bounds.
    pub fn scan_block(&self, anchor: Coordinate) -> usize {
        (0..2)
            .flat_map(|dr| (0..2).map(move |dc| Coordinate::new(anchor.row + dr, anchor.col + dc)))
            .filter_map(|coord| self.grid.get(coord))
            .filter(|cell| cell.ship.is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ships::{Axis, ShipSpot};
    use rand::{rngs::StdRng, SeedableRng};

    fn board_8x8() -> Board {
        let mut setup = BoardSetup::new(8);
        for spot in &[
            ShipSpot {
                class: ShipClass::Battleship,
                bow: Coordinate::new(0, 0),
                axis: Axis::Horizontal,
            },
            ShipSpot {
                class: ShipClass::Cruiser,
                bow: Coordinate::new(2, 0),
                axis: Axis::Horizontal,
            },
            ShipSpot {
                class: ShipClass::Submarine,
                bow: Coordinate::new(4, 0),
                axis: Axis::Horizontal,
            },
            ShipSpot {
                class: ShipClass::Destroyer,
                bow: Coordinate::new(6, 0),
                axis: Axis::Horizontal,
            },
        ] {
            setup.place(*spot).unwrap();
        }
        match setup.start() {
            Ok(board) => board,
            Err(_) => panic!("full fleet placed but board not ready"),
        }
    }

    #[test]
    fn resolved_cells_are_terminal() {
        let mut board = board_8x8();
        let coord = Coordinate::new(7, 7);
        assert_eq!(board.resolve(coord, "attack").unwrap(), ShotResult::Miss);
        let err = board.resolve(coord, "attack").unwrap_err();
        assert_eq!(err.reason(), CannotShootReason::AlreadyResolved);
        // The mark is unchanged.
        assert_eq!(board.cell(coord).unwrap().mark(), Some(ShotMark::Miss));
    }

    #[test]
    fn sinking_reports_sunk_and_tracks_hits() {
        let mut board = board_8x8();
        assert_eq!(
            board.resolve(Coordinate::new(6, 0), "attack").unwrap(),
            ShotResult::Hit(ShipClass::Destroyer)
        );
        assert_eq!(board.ship(ShipClass::Destroyer).unwrap().hits(), 1);
        assert_eq!(
            board.resolve(Coordinate::new(6, 1), "attack").unwrap(),
            ShotResult::Sunk(ShipClass::Destroyer)
        );
        assert!(board.ship(ShipClass::Destroyer).unwrap().sunk());
        assert!(!board.defeated());
    }

    #[test]
    fn defeated_when_every_ship_cell_hit() {
        let mut board = board_8x8();
        let targets: Vec<Coordinate> = board
            .iter_ships()
            .flat_map(|ship| ship.coords().collect::<Vec<_>>())
            .collect();
        for coord in targets {
            board.resolve(coord, "attack").unwrap();
        }
        assert!(board.defeated());
    }

    #[test]
    fn random_intact_ship_cell_skips_resolved() {
        let mut board = board_8x8();
        let mut rng = StdRng::seed_from_u64(7);
        while let Some(coord) = board.random_intact_ship_cell(&mut rng) {
            let cell = board.cell(coord).unwrap();
            assert!(cell.ship().is_some());
            assert!(!cell.resolved());
            board.resolve(coord, "attack").unwrap();
        }
        // Every ship cell drawn exactly once, so the board is now defeated.
        assert!(board.defeated());
    }

    #[test]
    fn scan_block_clips_at_edges() {
        let board = board_8x8();
        // Battleship occupies (0,0)..(0,3); cruiser (2,0)..(2,2).
        assert_eq!(board.scan_block(Coordinate::new(0, 0)), 2);
        assert_eq!(board.scan_block(Coordinate::new(7, 7)), 0);
        assert_eq!(board.scan_block(Coordinate::new(1, 0)), 2);
    }
}
