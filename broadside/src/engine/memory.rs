//! The engine's private memory of one game.
//!
//! Memory is owned by a single engine instance and never read by the other
//! side. It is reconstructible from the move log alone: [`EngineMemory::rebuild`]
//! replays the whole log and produces the same state an engine maintained
//! incrementally, so memory can be discarded at any time without semantic
//! loss.

use std::collections::HashSet;

use rand::{seq::SliceRandom, Rng};

use crate::{
    board::Coordinate,
    config::EngineTuning,
    engine::pattern::{detect_runs, Segment},
    room::{MoveOutcome, Player, RoomSnapshot},
};

/// Weight multiplier per live hit a candidate ship placement covers when
/// accumulating the base probability density. Placements explaining observed
/// hits should dominate the mass around them.
const PLACEMENT_HIT_WEIGHT: f64 = 8.0;

/// Coarse strategy stage of the engine.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    /// No unexplained hits yet; searching for ships.
    Hunting,
    /// At least one hit belongs to a ship still afloat; finishing it.
    Targeting,
    /// Late game: most of the board shot or almost no opposing ships left.
    Endgame,
}

/// One of the engine's own shots and whether it struck a ship.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ShotNote {
    pub coord: Coordinate,
    pub hit: bool,
}

/// Everything the engine remembers about the opposing grid.
#[derive(Debug)]
pub struct EngineMemory {
    me: Player,
    size: usize,
    /// Move-log entries already replayed.
    replayed: usize,
    /// Own shots in firing order.
    shots: Vec<ShotNote>,
    /// Cells already resolved on the opposing grid.
    resolved: HashSet<Coordinate>,
    /// Per-cell likelihood estimate, row-major. Non-negative; exactly 0.0
    /// for resolved cells.
    probability: Vec<f64>,
    /// Hits belonging to ships still afloat.
    live_hits: Vec<Coordinate>,
    /// Collinear runs detected over the live hits.
    segments: Vec<Segment>,
    /// Revealed, still-unresolved enemy cells.
    revealed: Vec<Coordinate>,
    phase: Phase,
}

impl EngineMemory {
    pub fn new(me: Player, size: usize) -> Self {
        Self {
            me,
            size,
            replayed: 0,
            shots: Vec::new(),
            resolved: HashSet::new(),
            probability: vec![1.0; size * size],
            live_hits: Vec::new(),
            segments: Vec::new(),
            revealed: Vec::new(),
            phase: Phase::Hunting,
        }
    }

    /// Reconstruct memory from scratch by replaying the snapshot's whole
    /// move log. Equivalent to having called [`update`][Self::update] after
    /// every move.
    pub fn rebuild(me: Player, snap: &RoomSnapshot, tuning: &EngineTuning) -> Self {
        let mut memory = Self::new(me, snap.size);
        memory.update(snap, tuning);
        memory
    }

    /// Absorb the snapshot: replay any new own moves from the log, then
    /// recompute the probability grid, run detection, and phase tag.
    pub fn update(&mut self, snap: &RoomSnapshot, tuning: &EngineTuning) {
        for record in snap.moves.iter().skip(self.replayed) {
            if record.actor != self.me || !record.kind.is_attack() {
                continue;
            }
            if let MoveOutcome::Shots { hits, misses } = &record.outcome {
                for &coord in hits {
                    self.shots.push(ShotNote { coord, hit: true });
                    self.resolved.insert(coord);
                }
                for &coord in misses {
                    self.shots.push(ShotNote { coord, hit: false });
                    self.resolved.insert(coord);
                }
            }
        }
        self.replayed = snap.moves.len();
        self.recompute(snap, tuning);
    }

    fn recompute(&mut self, snap: &RoomSnapshot, tuning: &EngineTuning) {
        let enemy = snap.side(self.me.opponent());
        let afloat = &enemy.ships_afloat;

        // A hit is live while the ship it exposed is still afloat.
        self.live_hits = self
            .shots
            .iter()
            .filter(|note| note.hit)
            .map(|note| note.coord)
            .filter(|&coord| match enemy.cell(coord).and_then(|cell| cell.ship) {
                Some(class) => afloat.contains(&class),
                None => true,
            })
            .collect();

        // Base density: every way a remaining ship could still lie, weighted
        // toward placements that explain live hits.
        let mut grid = vec![0.0f64; self.size * self.size];
        let live: HashSet<Coordinate> = self.live_hits.iter().copied().collect();
        for ship in afloat {
            let len = ship.len();
            for row in 0..self.size {
                for col in 0..self.size {
                    for &(dr, dc) in &[(0usize, 1usize), (1, 0)] {
                        let end_row = row + dr * (len - 1);
                        let end_col = col + dc * (len - 1);
                        if end_row >= self.size || end_col >= self.size {
                            continue;
                        }
                        let cells =
                            (0..len).map(|i| Coordinate::new(row + dr * i, col + dc * i));
                        let mut covered_hits = 0;
                        let mut valid = true;
                        for coord in cells.clone() {
                            if live.contains(&coord) {
                                covered_hits += 1;
                            } else if self.resolved.contains(&coord) {
                                // A miss or a sunk ship's cell blocks the lane.
                                valid = false;
                                break;
                            }
                        }
                        if !valid {
                            continue;
                        }
                        let weight = PLACEMENT_HIT_WEIGHT.powi(covered_hits);
                        for coord in cells {
                            if !self.resolved.contains(&coord) {
                                grid[coord.row * self.size + coord.col] += weight;
                            }
                        }
                    }
                }
            }
        }

        // Adjacency adjustments from the freshest shots: boost around live
        // hits, damp around misses.
        let fresh = self.shots.len().saturating_sub(tuning.fresh_window);
        for note in &self.shots[fresh..] {
            let factor = if note.hit {
                if !live.contains(&note.coord) {
                    continue;
                }
                tuning.hit_boost
            } else {
                tuning.miss_damp
            };
            for neighbor in note.coord.orthogonal() {
                if neighbor.row < self.size
                    && neighbor.col < self.size
                    && !self.resolved.contains(&neighbor)
                {
                    grid[neighbor.row * self.size + neighbor.col] *= factor;
                }
            }
        }

        for coord in &self.resolved {
            grid[coord.row * self.size + coord.col] = 0.0;
        }
        self.probability = grid;

        let resolved = self.resolved.clone();
        self.segments = detect_runs(
            &self.live_hits,
            self.size,
            move |coord| resolved.contains(&coord),
            tuning.extension_confidence,
        );

        self.revealed = enemy
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.revealed && !cell.resolved())
            .map(|(i, _)| Coordinate::new(i / self.size, i % self.size))
            .collect();

        let cells_total = (self.size * self.size) as f64;
        self.phase = if !self.live_hits.is_empty() {
            Phase::Targeting
        } else if self.shots.len() as f64 >= cells_total * tuning.endgame_shot_fraction
            || afloat.len() <= tuning.endgame_ships_afloat
        {
            Phase::Endgame
        } else {
            Phase::Hunting
        };
    }

    /// The engine's current strategy phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Own shots in firing order.
    pub fn shots(&self) -> &[ShotNote] {
        &self.shots
    }

    /// The per-cell likelihood grid, row-major.
    pub fn probability(&self) -> &[f64] {
        &self.probability
    }

    /// The likelihood estimate of one cell.
    pub fn probability_at(&self, coord: Coordinate) -> f64 {
        if coord.row < self.size && coord.col < self.size {
            self.probability[coord.row * self.size + coord.col]
        } else {
            0.0
        }
    }

    /// Detected collinear hit runs.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether a cell on the opposing grid is already resolved.
    pub fn is_resolved(&self, coord: Coordinate) -> bool {
        self.resolved.contains(&coord)
    }

    /// Live hits that do not belong to any detected run.
    pub fn lone_hits(&self) -> Vec<Coordinate> {
        self.live_hits
            .iter()
            .copied()
            .filter(|coord| !self.segments.iter().any(|seg| seg.cells.contains(coord)))
            .collect()
    }

    /// A revealed, unresolved enemy cell, if one is known.
    pub fn revealed_target(&self) -> Option<Coordinate> {
        self.revealed.first().copied()
    }

    /// The unresolved cell with the highest non-zero likelihood. Ties break
    /// toward the first in row-major order.
    pub fn best_cell(&self) -> Option<Coordinate> {
        let mut best: Option<(Coordinate, f64)> = None;
        for (i, &p) in self.probability.iter().enumerate() {
            let coord = Coordinate::new(i / self.size, i % self.size);
            if p <= 0.0 || self.resolved.contains(&coord) {
                continue;
            }
            if best.map_or(true, |(_, bp)| p > bp) {
                best = Some((coord, p));
            }
        }
        best.map(|(coord, _)| coord)
    }

    /// First unresolved cell on the even checkerboard parity. Systematic
    /// coverage that cannot miss a ship of length >= 2.
    pub fn parity_scan(&self) -> Option<Coordinate> {
        self.iter_unresolved()
            .find(|coord| (coord.row + coord.col) % 2 == 0)
    }

    /// First unresolved cell in row-major order.
    pub fn first_unresolved(&self) -> Option<Coordinate> {
        self.iter_unresolved().next()
    }

    /// A uniformly random unresolved cell.
    pub fn random_unresolved(&self, rng: &mut impl Rng) -> Option<Coordinate> {
        let open: Vec<Coordinate> = self.iter_unresolved().collect();
        open.choose(rng).copied()
    }

    /// Unresolved in-bounds orthogonal neighbors of a cell.
    pub fn unresolved_neighbors(&self, coord: Coordinate) -> Vec<Coordinate> {
        coord
            .orthogonal()
            .filter(|n| n.row < self.size && n.col < self.size)
            .filter(|n| !self.resolved.contains(n))
            .collect()
    }

    fn iter_unresolved(&self) -> impl Iterator<Item = Coordinate> + '_ {
        let size = self.size;
        (0..size * size)
            .map(move |i| Coordinate::new(i / size, i % size))
            .filter(move |coord| !self.resolved.contains(coord))
    }
}
