//! Errors used by the `Board` and `BoardSetup`.

use thiserror::Error;

use crate::{board::Coordinate, ships::ShipClass};

/// Reason why a ship could not be placed at a given position.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum CannotPlaceReason {
    /// The specified ship was already placed.
    #[error("ship was already placed")]
    AlreadyPlaced,
    /// The ship is not part of this board's fleet.
    #[error("ship is not part of this fleet")]
    NotInFleet,
    /// Part of the ship would fall outside the board.
    #[error("the requested position runs out of bounds")]
    OutOfBounds,
    /// One or more requested cells is already occupied.
    #[error("the requested position was already occupied")]
    AlreadyOccupied,
    /// The position touches another ship; a one-cell buffer is required.
    #[error("the requested position touches another ship")]
    TooClose,
}

/// Error caused when attempting to place a ship in an invalid position.
#[derive(Debug, Error)]
#[error("could not place {ship:?}: {reason}")]
pub struct PlaceError {
    #[source]
    reason: CannotPlaceReason,
    ship: ShipClass,
}

impl PlaceError {
    pub(super) fn new(reason: CannotPlaceReason, ship: ShipClass) -> Self {
        Self { reason, ship }
    }

    /// Get the reason placement was aborted.
    pub fn reason(&self) -> CannotPlaceReason {
        self.reason
    }

    /// Get the ship whose placement was attempted.
    pub fn ship(&self) -> ShipClass {
        self.ship
    }
}

/// Reason why a particular cell could not be shot.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CannotShootReason {
    /// The cell selected was out of bounds on the board.
    OutOfBounds,
    /// An attack has already resolved against that cell.
    AlreadyResolved,
}

/// Error returned when trying to shoot a cell.
#[derive(Debug, Error)]
#[error("could not shoot cell {coord}: {reason:?}")]
pub struct ShotError {
    /// Reason why the cell could not be shot.
    reason: CannotShootReason,

    /// The coordinate of the cell.
    coord: Coordinate,
}

impl ShotError {
    pub(super) fn new(reason: CannotShootReason, coord: Coordinate) -> Self {
        Self { reason, coord }
    }

    /// Get the reason the shot failed.
    pub fn reason(&self) -> CannotShootReason {
        self.reason
    }

    /// Get the coordinate of the shot cell.
    pub fn coord(&self) -> Coordinate {
        self.coord
    }
}
