//! Broadside is a turn-based, two-party grid combat engine. Each side owns a
//! hidden fleet on a square grid and the sides alternate attacks against each
//! other's grid. A catalog of single-use abilities augments the plain
//! one-cell attack with multi-cell patterns, passive interceptors, and
//! reconnaissance reveals.
//!
//! The crate is split into layers, leaves first:
//!
//! - [`board`] holds the per-player grid of cells and the ship bookkeeping.
//! - [`ability`] is the static catalog of ability kinds and their per-player
//!   lifecycle state.
//! - [`room`] owns a full game: both boards, the turn token, the move log,
//!   and every resolution entry point (plain attack, pattern abilities,
//!   support abilities, passive interception, win checking).
//! - [`registry`] hands out shared room handles which serialize all mutation
//!   through one writer and publish snapshots to subscribers.
//! - [`engine`] is the automated opponent. It consumes the same entry points
//!   a human driver uses and keeps its own private memory (shot history,
//!   probability grid, inferred ship segments) to choose its next action.

pub mod ability;
pub mod board;
pub mod config;
pub mod engine;
pub mod registry;
pub mod room;
pub mod ships;

pub use self::{
    ability::{AbilityCategory, AbilityKind, AbilityRack, AbilityState},
    board::{Board, BoardSetup, Cell, CellRef, Coordinate, Quadrant, ShotMark, ShotResult},
    config::{EngineTuning, RoomConfig},
    engine::{generate_layout, Difficulty, OpponentEngine, PlacementBias, StrategyOracle},
    registry::{CreateError, RoomHandle, RoomId, RoomRegistry},
    room::{
        ActionReport, GameError, MoveKind, MoveOutcome, MoveRecord, Player, Reveal, Room,
        RoomSnapshot, Salvo, Scan, SetupError, Shot, StateConflict, ValidationError, Verdict,
        VictoryKind,
    },
    ships::{Axis, FleetPlacement, ShipClass, ShipSpot},
};
