//! Room and engine configuration with documented constants.
//!
//! The tuning values are collected here with notes on their purpose and how
//! they interact, so gameplay pacing can be adjusted in one place.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Smallest supported board side length.
pub const MIN_BOARD_SIZE: usize = 6;
/// Largest supported board side length.
pub const MAX_BOARD_SIZE: usize = 12;

/// Fixed parameters of one game room.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Side length of both players' square boards.
    pub board_size: usize,
    /// Whether the room is moderator-hosted. Privileged abilities can only
    /// be granted in moderated rooms.
    pub moderated: bool,
    /// Seed for the room's random choices (reveal targeting, retaliation
    /// targeting). `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl RoomConfig {
    /// Build a config for the given board size. Returns `None` when the size
    /// is outside the supported 6..=12 range.
    pub fn new(board_size: usize) -> Option<Self> {
        if (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&board_size) {
            Some(Self {
                board_size,
                moderated: false,
                seed: None,
            })
        } else {
            None
        }
    }

    /// Mark the room as moderator-hosted.
    pub fn moderated(mut self) -> Self {
        self.moderated = true;
        self
    }

    /// Fix the room's random seed, for reproducible games.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for RoomConfig {
    /// A standard unmoderated 10x10 room.
    fn default() -> Self {
        Self {
            board_size: 10,
            moderated: false,
            seed: None,
        }
    }
}

/// Heuristic constants of the opponent decision engine.
///
/// These values were tuned by playing the engine against itself; they shape
/// how quickly it converges on a found ship versus how widely it searches.
#[derive(Debug, Clone)]
pub struct EngineTuning {
    /// Multiplier applied to the probability of cells orthogonally adjacent
    /// to an unresolved hit. Larger values make the engine chase wounded
    /// ships more single-mindedly.
    pub hit_boost: f64,

    /// Multiplier applied to the probability of cells adjacent to a recent
    /// miss. Must stay in `0.0..=1.0`: it suppresses but never zeroes, so a
    /// run of misses cannot blind the engine to a region entirely.
    pub miss_damp: f64,

    /// How many of the engine's most recent moves count as "fresh" for the
    /// adjacency adjustments above.
    pub fresh_window: usize,

    /// Confidence assigned to the predicted extension cells of a detected
    /// collinear hit run. Compared against nothing today; reported with the
    /// prediction so callers can rank competing segments.
    pub extension_confidence: f64,

    /// Fraction of the board that must be shot before the engine considers
    /// the game to have entered its endgame phase.
    pub endgame_shot_fraction: f64,

    /// Opposing ships afloat at or below which the engine treats the game as
    /// endgame regardless of move count.
    pub endgame_ships_afloat: usize,

    /// Hard deadline for one external strategy oracle consultation. On
    /// timeout the engine falls through to its local heuristic; the oracle
    /// future is dropped and any late response discarded.
    pub oracle_timeout: Duration,
}

impl Default for EngineTuning {
    fn default() -> Self {
        Self {
            hit_boost: 2.6,
            miss_damp: 0.65,
            fresh_window: 6,
            extension_confidence: 0.85,
            endgame_shot_fraction: 0.55,
            endgame_ships_afloat: 1,
            oracle_timeout: Duration::from_millis(1500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_size_bounds_are_enforced() {
        assert!(RoomConfig::new(5).is_none());
        assert!(RoomConfig::new(13).is_none());
        assert!(RoomConfig::new(6).is_some());
        assert!(RoomConfig::new(12).is_some());
    }
}
