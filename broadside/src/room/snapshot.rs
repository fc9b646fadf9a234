//! Serializable snapshots of a room, published to subscribers on every
//! committed mutation.
//!
//! A snapshot is the shared room document: both sides receive the same view,
//! so ship positions are redacted to what an opponent could legitimately
//! see (hit or revealed cells). The move log travels with the snapshot so a
//! decision engine can rebuild its memory from it alone.

use serde::{Deserialize, Serialize};

use crate::{
    ability::{AbilityKind, AbilityState},
    board::{Coordinate, ShotMark},
    registry::RoomId,
    room::{MoveRecord, Player, Room, Verdict},
    ships::ShipClass,
};

/// Redacted view of one cell.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    /// The attack outcome recorded against the cell, if any.
    pub mark: Option<ShotMark>,
    /// Display label of the action that resolved the cell.
    pub label: Option<String>,
    /// Whether the cell was exposed by a reconnaissance reveal.
    pub revealed: bool,
    /// The occupying ship class, present only when the cell is hit or
    /// revealed.
    pub ship: Option<ShipClass>,
}

impl CellView {
    /// Whether an attack already resolved against this cell.
    pub fn resolved(&self) -> bool {
        self.mark.is_some()
    }
}

/// The public state of one granted ability.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AbilityView {
    pub kind: AbilityKind,
    pub state: AbilityState,
}

/// Redacted view of one side of the room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideView {
    pub player: Player,
    /// Side length of the board the cells belong to.
    pub size: usize,
    /// Row-major cell views.
    pub cells: Vec<CellView>,
    /// Ship classes not yet sunk on this side's board.
    pub ships_afloat: Vec<ShipClass>,
    /// Ship classes already sunk on this side's board.
    pub ships_sunk: Vec<ShipClass>,
    /// Granted abilities and their lifecycle states.
    pub abilities: Vec<AbilityView>,
}

impl SideView {
    /// The view of the cell at the given coordinate, if in bounds.
    pub fn cell(&self, coord: Coordinate) -> Option<&CellView> {
        if coord.row < self.size && coord.col < self.size {
            self.cells.get(coord.row * self.size + coord.col)
        } else {
            None
        }
    }

    /// Iterate the coordinates of cells no attack has resolved against yet.
    pub fn unresolved(&self) -> impl Iterator<Item = Coordinate> + '_ {
        let size = self.size;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            if cell.resolved() {
                None
            } else {
                Some(Coordinate::new(i / size, i % size))
            }
        })
    }
}

/// A point-in-time view of a whole room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room: RoomId,
    pub size: usize,
    pub turn: Player,
    pub verdict: Option<Verdict>,
    pub sides: [SideView; 2],
    pub moves: Vec<MoveRecord>,
}

impl RoomSnapshot {
    /// The view of the given player's side.
    pub fn side(&self, player: Player) -> &SideView {
        &self.sides[player.index()]
    }

    /// Whether the game has ended.
    pub fn over(&self) -> bool {
        self.verdict.is_some()
    }

    /// The ability state of the given kind on the given side, if granted.
    pub fn ability(&self, player: Player, kind: AbilityKind) -> Option<AbilityState> {
        self.side(player)
            .abilities
            .iter()
            .find(|view| view.kind == kind)
            .map(|view| view.state)
    }
}

impl Room {
    /// Build the shared snapshot of this room.
    pub fn snapshot(&self, room: RoomId) -> RoomSnapshot {
        let sides = [self.side_view(Player::P1), self.side_view(Player::P2)];
        RoomSnapshot {
            room,
            size: self.size(),
            turn: self.turn(),
            verdict: self.verdict(),
            sides,
            moves: self.moves().to_vec(),
        }
    }

    fn side_view(&self, player: Player) -> SideView {
        let board = self.board(player);
        let size = board.size();
        let mut cells = Vec::with_capacity(size * size);
        for row in board.iter_coordinates() {
            for coord in row {
                let cell = board
                    .cell(coord)
                    .expect("iterated coordinate out of bounds");
                let exposed = cell.mark() == Some(ShotMark::Hit) || cell.revealed();
                cells.push(CellView {
                    mark: cell.mark(),
                    label: cell.label().map(str::to_owned),
                    revealed: cell.revealed(),
                    ship: if exposed { cell.ship() } else { None },
                });
            }
        }
        let (afloat, sunk): (Vec<_>, Vec<_>) =
            board.iter_ships().partition(|ship| !ship.sunk());
        SideView {
            player,
            size,
            cells,
            ships_afloat: afloat.into_iter().map(|ship| ship.class()).collect(),
            ships_sunk: sunk.into_iter().map(|ship| ship.class()).collect(),
            abilities: self
                .rack(player)
                .iter()
                .map(|(kind, state)| AbilityView { kind, state })
                .collect(),
        }
    }
}
