//! Error taxonomy for game actions.
//!
//! Expected rule violations are [`ValidationError`]s: rejected before any
//! mutation and safe to retry once the precondition is corrected. Missing or
//! uninitialized collaborators are [`StateConflict`]s and need external
//! remediation. An attack absorbed by an installed jam is *not* an error;
//! it is reported as [`ActionReport::Intercepted`][super::ActionReport].

use thiserror::Error;

use crate::{
    ability::{AbilityKind, GrantError},
    board::{CannotShootReason, Coordinate, PlaceError, ShotError},
    registry::RoomId,
    room::Player,
};

/// An action that violated a game rule. Nothing was mutated.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ValidationError {
    /// The game is already over.
    #[error("the game is already over")]
    GameOver,

    /// The acting player does not hold the turn token.
    #[error("player attempted to act out of turn")]
    OutOfTurn,

    /// The target coordinate is outside the board.
    #[error("coordinate {0} is out of bounds")]
    OutOfBounds(Coordinate),

    /// An attack already resolved against the target cell.
    #[error("cell {0} was already resolved")]
    AlreadyResolved(Coordinate),

    /// The ability was never granted, or was already spent.
    #[error("ability {0:?} is not active or was already used")]
    AbilityUnavailable(AbilityKind),

    /// The ability kind was already granted this game.
    #[error("ability {0:?} was already granted this game")]
    AlreadyGranted(AbilityKind),

    /// The player already holds the maximum of active common abilities.
    #[error("no more common abilities may be active at once")]
    CapExceeded,

    /// The ability kind is restricted to moderator-hosted rooms.
    #[error("ability {0:?} requires a moderated room")]
    RequiresModerator(AbilityKind),
}

impl ValidationError {
    pub(crate) fn from_grant(kind: AbilityKind, err: GrantError) -> Self {
        match err {
            GrantError::AlreadyGranted => ValidationError::AlreadyGranted(kind),
            GrantError::CapExceeded => ValidationError::CapExceeded,
            GrantError::RequiresModerator => ValidationError::RequiresModerator(kind),
        }
    }

    pub(crate) fn from_shot(err: ShotError) -> Self {
        match err.reason() {
            CannotShootReason::OutOfBounds => ValidationError::OutOfBounds(err.coord()),
            CannotShootReason::AlreadyResolved => ValidationError::AlreadyResolved(err.coord()),
        }
    }
}

/// A referenced collaborator was missing or not initialized. Not retryable
/// without external remediation.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum StateConflict {
    /// No room with the given id exists in the registry.
    #[error("room {0} does not exist")]
    RoomNotFound(RoomId),

    /// A room with the given id already exists in the registry.
    #[error("room {0} already exists")]
    RoomExists(RoomId),

    /// The given player's grid was never initialized.
    #[error("player {0:?} has no initialized grid")]
    GridMissing(Player),
}

/// Any failure of a game action.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum GameError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Conflict(#[from] StateConflict),
}

impl GameError {
    /// Whether this failure is a rule violation that the caller can correct
    /// and retry.
    pub fn is_validation(&self) -> bool {
        matches!(self, GameError::Validation(_))
    }
}

/// Error building a room from placement plans.
#[derive(Debug, Error)]
pub enum SetupError {
    /// A ship in the plan could not be placed.
    #[error(transparent)]
    Place(#[from] PlaceError),

    /// The plan did not place the whole fleet.
    #[error("placement plan for {0:?} did not cover the whole fleet")]
    IncompleteFleet(Player),
}
