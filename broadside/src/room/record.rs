//! The append-only move log.
//!
//! Every resolved action appends exactly one record. Records are never
//! mutated after append; they are the only source of truth the opponent
//! engine replays to reconstruct its memory.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::{board::Coordinate, room::Player};

/// The kind of action a move record describes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum MoveKind {
    /// Plain single-cell attack.
    Attack,
    /// Attack-pattern ability: center plus diagonals.
    Nuke,
    /// Attack-pattern ability: middle plus both side cells.
    Annihilate,
    /// Privileged quadrant-wide attack.
    Quadrant,
    /// Reconnaissance reveal of one intact ship cell.
    Hacker,
    /// 2x2 block density scan.
    Scanner,
    /// A jam passive was armed.
    JamInstall,
    /// A counter passive was armed.
    CounterInstall,
    /// An armed counter retaliated after a hit.
    CounterStrike,
    /// An attack was absorbed by an installed jam.
    Intercepted,
    /// A player conceded the game.
    Surrender,
}

impl MoveKind {
    /// Whether this record describes shots fired at a grid.
    pub fn is_attack(self) -> bool {
        matches!(
            self,
            MoveKind::Attack
                | MoveKind::Nuke
                | MoveKind::Annihilate
                | MoveKind::Quadrant
                | MoveKind::CounterStrike
        )
    }
}

/// What a recorded action did.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// Cells resolved by an attack-class action, split by result.
    Shots {
        hits: Vec<Coordinate>,
        misses: Vec<Coordinate>,
    },
    /// A reveal completed; `found` is false when no intact cell existed.
    Reveal { found: bool },
    /// A scan completed with the given ship-cell count.
    Scan { ships: usize },
    /// A passive was armed.
    Installed,
    /// The action was absorbed by a jam.
    Blocked,
    /// The actor conceded.
    Conceded,
}

/// One append-only log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRecord {
    pub kind: MoveKind,
    pub actor: Player,
    /// The cells the action was aimed at (not necessarily those resolved;
    /// see [`MoveOutcome::Shots`] for per-cell results).
    pub coords: Vec<Coordinate>,
    pub outcome: MoveOutcome,
    pub at: SystemTime,
}
