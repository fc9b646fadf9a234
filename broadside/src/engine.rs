//! The automated opponent's decision engine.
//!
//! An engine instance drives exactly one side of one room through the same
//! entry points a human front end uses. It subscribes to the room's
//! snapshot stream, acts whenever the turn token transfers to it, and keeps
//! its own private memory of the opposing grid. Choice of action runs down
//! an ordered fallback chain:
//!
//! 1. a short-circuit for provably-best moves (a collinear hit run with the
//!    line-covering pattern ability still available);
//! 2. a difficulty-gated ability play;
//! 3. the external strategy oracle, raced against a hard timeout;
//! 4. the local heuristic (predicted extensions, then the hottest cell,
//!    then checkerboard coverage);
//! 5. the first unresolved cell, so the engine always produces a move.
//!
//! A `ValidationError` anywhere in the chain means the decision was stale;
//! the engine falls through to the next rung instead of stalling.

use std::{cmp::Ordering, sync::Arc};

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    ability::AbilityKind,
    board::{Coordinate, Quadrant},
    config::EngineTuning,
    registry::RoomHandle,
    room::{GameError, Player, RoomSnapshot},
    ships::Axis,
};

#[cfg(feature = "http-oracle")]
pub use self::oracle::HttpOracle;
pub use self::{
    difficulty::{Difficulty, ParseDifficultyError, PlacementBias},
    memory::{EngineMemory, Phase, ShotNote},
    oracle::{OracleAction, OracleError, OracleFuture, OracleRequest, StrategyOracle},
    pattern::Segment,
    placement::generate_layout,
};

mod difficulty;
mod memory;
mod oracle;
mod pattern;
mod placement;

/// One action the engine can submit against its room.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum EngineAction {
    Attack(Coordinate),
    Nuke(Coordinate),
    Annihilate(Coordinate, Axis),
    Quadrant(Quadrant),
    Hacker,
    Scanner(Coordinate),
    InstallJam,
    InstallCounter,
}

/// The automated opponent for one side of one room.
pub struct OpponentEngine {
    handle: Arc<RoomHandle>,
    me: Player,
    difficulty: Difficulty,
    tuning: EngineTuning,
    memory: EngineMemory,
    oracle: Option<Arc<dyn StrategyOracle>>,
    rng: StdRng,
}

impl OpponentEngine {
    /// Create an engine playing `me` in the given room.
    pub fn new(handle: Arc<RoomHandle>, me: Player, difficulty: Difficulty) -> Self {
        let size = handle.snapshot().size;
        Self {
            handle,
            me,
            difficulty,
            tuning: EngineTuning::default(),
            memory: EngineMemory::new(me, size),
            oracle: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the default heuristic tuning.
    pub fn with_tuning(mut self, tuning: EngineTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Attach an external strategy oracle.
    pub fn with_oracle(mut self, oracle: Arc<dyn StrategyOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Seed the engine's own randomness, for reproducible games.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// The engine's private memory, for inspection.
    pub fn memory(&self) -> &EngineMemory {
        &self.memory
    }

    /// Drive the engine until the game ends. At most one think step is ever
    /// in flight: the loop is strictly sequential per room-side.
    pub async fn run(mut self) {
        let mut updates = self.handle.subscribe();
        loop {
            let snap = updates.borrow_and_update().clone();
            if snap.over() {
                break;
            }
            if snap.turn == self.me {
                self.memory.update(&snap, &self.tuning);
                // The think step races game-end observation so a surrender
                // on the other side cancels a pending oracle call; the
                // dropped future discards any late response.
                let action = tokio::select! {
                    action = self.choose(&snap) => Some(action),
                    _ = game_ended(&mut updates) => None,
                };
                match action {
                    Some(action) => {
                        self.perform(action);
                        continue;
                    }
                    None => break,
                }
            }
            if updates.changed().await.is_err() {
                break;
            }
        }
        debug!(player = ?self.me, "engine loop ended");
    }

    /// Take one turn against the given snapshot, without the subscription
    /// loop. Used by drivers that interleave the engine with other input.
    pub async fn take_turn(&mut self, snap: &RoomSnapshot) {
        self.memory.update(snap, &self.tuning);
        let action = self.choose(snap).await;
        self.perform(action);
    }

    async fn choose(&mut self, snap: &RoomSnapshot) -> EngineAction {
        let delay = self.difficulty.think_delay(&mut self.rng);
        tokio::time::sleep(delay).await;
        if let Some(action) = self.short_circuit(snap) {
            return action;
        }
        if let Some(action) = self.ability_gambit(snap) {
            return action;
        }
        if let Some(action) = self.consult_oracle(snap).await {
            return action;
        }
        EngineAction::Attack(self.pick_cell())
    }

    /// Rung 1: a two-hit collinear run with the line-covering pattern
    /// ability still available is always worth firing along the run.
    fn short_circuit(&mut self, snap: &RoomSnapshot) -> Option<EngineAction> {
        if !self.ability_ready(snap, AbilityKind::Annihilate) {
            return None;
        }
        let seg = self
            .memory
            .segments()
            .iter()
            .filter(|seg| seg.cells.len() >= 2 && !seg.extensions.is_empty())
            .max_by_key(|seg| seg.cells.len())?;
        let target = seg
            .extensions
            .iter()
            .copied()
            .max_by(|a, b| {
                self.memory
                    .probability_at(*a)
                    .partial_cmp(&self.memory.probability_at(*b))
                    .unwrap_or(Ordering::Equal)
            })?;
        debug!(player = ?self.me, %target, "short-circuit: firing along detected run");
        Some(EngineAction::Annihilate(target, seg.axis))
    }

    /// Rung 2: spend an ability this turn, with tier-dependent probability
    /// and tier-dependent targeting quality.
    fn ability_gambit(&mut self, snap: &RoomSnapshot) -> Option<EngineAction> {
        if !self.rng.gen_bool(self.difficulty.ability_use_chance()) {
            return None;
        }
        let phase = self.memory.phase();
        if self.ability_ready(snap, AbilityKind::Nuke) && phase != Phase::Targeting {
            return Some(EngineAction::Nuke(self.nuke_target()));
        }
        if self.ability_ready(snap, AbilityKind::Quadrant) {
            return Some(EngineAction::Quadrant(self.quadrant_target()));
        }
        if self.ability_ready(snap, AbilityKind::Scanner) && phase == Phase::Hunting {
            return Some(EngineAction::Scanner(self.scanner_target()));
        }
        if self.ability_ready(snap, AbilityKind::Hacker) && phase != Phase::Targeting {
            return Some(EngineAction::Hacker);
        }
        if self.ability_ready(snap, AbilityKind::Counter) {
            return Some(EngineAction::InstallCounter);
        }
        if self.ability_ready(snap, AbilityKind::Jam) && self.under_pressure(snap) {
            return Some(EngineAction::InstallJam);
        }
        None
    }

    /// Rung 3: consult the external oracle, bounded by the configured
    /// timeout. Malformed or illegal proposals are discarded.
    async fn consult_oracle(&mut self, snap: &RoomSnapshot) -> Option<EngineAction> {
        let oracle = self.oracle.as_ref()?;
        let request = OracleRequest::from_snapshot(snap, self.me);
        let proposal =
            match tokio::time::timeout(self.tuning.oracle_timeout, oracle.propose(request)).await {
                Ok(Ok(action)) => action,
                Ok(Err(err)) => {
                    warn!(player = ?self.me, %err, "oracle consultation failed");
                    return None;
                }
                Err(_) => {
                    warn!(player = ?self.me, "oracle consultation timed out");
                    return None;
                }
            };
        self.vet(proposal, snap)
    }

    /// Validate an oracle proposal against the board and rack before
    /// adopting it.
    fn vet(&self, proposal: OracleAction, snap: &RoomSnapshot) -> Option<EngineAction> {
        let open = |row: usize, col: usize| {
            let coord = Coordinate::new(row, col);
            if row < snap.size && col < snap.size && !self.memory.is_resolved(coord) {
                Some(coord)
            } else {
                None
            }
        };
        let action = match proposal {
            OracleAction::Attack { row, col } => EngineAction::Attack(open(row, col)?),
            OracleAction::Nuke { row, col } => {
                if !self.ability_ready(snap, AbilityKind::Nuke) {
                    return None;
                }
                EngineAction::Nuke(open(row, col)?)
            }
            OracleAction::Annihilate { row, col, axis } => {
                if !self.ability_ready(snap, AbilityKind::Annihilate) {
                    return None;
                }
                EngineAction::Annihilate(open(row, col)?, axis)
            }
            OracleAction::Quadrant { quadrant } => {
                if !self.ability_ready(snap, AbilityKind::Quadrant) {
                    return None;
                }
                EngineAction::Quadrant(quadrant)
            }
            OracleAction::Hacker => {
                if !self.ability_ready(snap, AbilityKind::Hacker) {
                    return None;
                }
                EngineAction::Hacker
            }
            OracleAction::Scanner { row, col } => {
                if !self.ability_ready(snap, AbilityKind::Scanner) {
                    return None;
                }
                EngineAction::Scanner(Coordinate::new(row.min(snap.size - 1), col.min(snap.size - 1)))
            }
            OracleAction::InstallJam => {
                if !self.ability_ready(snap, AbilityKind::Jam) {
                    return None;
                }
                EngineAction::InstallJam
            }
            OracleAction::InstallCounter => {
                if !self.ability_ready(snap, AbilityKind::Counter) {
                    return None;
                }
                EngineAction::InstallCounter
            }
        };
        Some(action)
    }

    /// Rungs 4 and 5: the local cell heuristic. Always yields a coordinate;
    /// if no unresolved cell remains the game is already decided.
    fn pick_cell(&mut self) -> Coordinate {
        // Tier-dependent mistake injection.
        if self.rng.gen_bool(self.difficulty.mistake_chance()) {
            if let Some(coord) = self.memory.random_unresolved(&mut self.rng) {
                return coord;
            }
        }
        if let Some(coord) = self.memory.revealed_target() {
            return coord;
        }
        if let Some(coord) = self.extension_target() {
            return coord;
        }
        if let Some(coord) = self.lone_hit_target() {
            return coord;
        }
        if let Some(coord) = self.memory.best_cell() {
            return coord;
        }
        if let Some(coord) = self.memory.parity_scan() {
            return coord;
        }
        self.memory
            .first_unresolved()
            .unwrap_or_else(|| Coordinate::new(0, 0))
    }

    /// Follow a detected run, or wander near it when accuracy fails.
    fn extension_target(&mut self) -> Option<Coordinate> {
        let seg = self
            .memory
            .segments()
            .iter()
            .filter(|seg| !seg.extensions.is_empty())
            .max_by_key(|seg| seg.cells.len())?;
        if self.rng.gen_bool(self.difficulty.adjacency_accuracy()) {
            seg.extensions.iter().copied().max_by(|a, b| {
                self.memory
                    .probability_at(*a)
                    .partial_cmp(&self.memory.probability_at(*b))
                    .unwrap_or(Ordering::Equal)
            })
        } else {
            let near: Vec<Coordinate> = seg
                .cells
                .iter()
                .flat_map(|&cell| self.memory.unresolved_neighbors(cell))
                .collect();
            near.choose(&mut self.rng).copied()
        }
    }

    /// Probe around a hit that is not yet part of a run.
    fn lone_hit_target(&mut self) -> Option<Coordinate> {
        let lone = self.memory.lone_hits();
        let &hit = lone.first()?;
        let neighbors = self.memory.unresolved_neighbors(hit);
        if neighbors.is_empty() {
            return None;
        }
        if self.rng.gen_bool(self.difficulty.adjacency_accuracy()) {
            neighbors.iter().copied().max_by(|a, b| {
                self.memory
                    .probability_at(*a)
                    .partial_cmp(&self.memory.probability_at(*b))
                    .unwrap_or(Ordering::Equal)
            })
        } else {
            neighbors.choose(&mut self.rng).copied()
        }
    }

    /// Pick the NUKE center. Harder tiers optimize the whole X pattern;
    /// weaker tiers settle for a hot cell or a random one.
    fn nuke_target(&mut self) -> Coordinate {
        let fallback = || Coordinate::new(0, 0);
        match self.difficulty {
            Difficulty::Easy => self
                .memory
                .random_unresolved(&mut self.rng)
                .unwrap_or_else(fallback),
            Difficulty::Medium => self.memory.best_cell().unwrap_or_else(fallback),
            Difficulty::Hard => {
                let mut best: Option<(Coordinate, f64)> = None;
                for coord in self.unresolved_cells() {
                    let score: f64 = std::iter::once(coord)
                        .chain(coord.diagonal())
                        .map(|c| self.memory.probability_at(c))
                        .sum();
                    if best.map_or(true, |(_, s)| score > s) {
                        best = Some((coord, score));
                    }
                }
                best.map(|(coord, _)| coord).unwrap_or_else(fallback)
            }
        }
    }

    /// Pick the SCANNER anchor: the densest unknown 2x2 block on the hard
    /// tier, a random unresolved cell otherwise.
    fn scanner_target(&mut self) -> Coordinate {
        if self.difficulty != Difficulty::Hard {
            return self
                .memory
                .random_unresolved(&mut self.rng)
                .unwrap_or_else(|| Coordinate::new(0, 0));
        }
        let mut best: Option<(Coordinate, f64)> = None;
        for coord in self.unresolved_cells() {
            let score: f64 = (0..2)
                .flat_map(|dr| (0..2).map(move |dc| Coordinate::new(coord.row + dr, coord.col + dc)))
                .map(|c| self.memory.probability_at(c))
                .sum();
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((coord, score));
            }
        }
        best.map(|(coord, _)| coord)
            .unwrap_or_else(|| Coordinate::new(0, 0))
    }

    /// Pick the quadrant with the most unresolved probability mass.
    fn quadrant_target(&mut self) -> Quadrant {
        let size = self.handle.snapshot().size;
        Quadrant::ALL
            .iter()
            .copied()
            .max_by(|a, b| {
                let mass = |q: Quadrant| -> f64 {
                    q.cells(size).map(|c| self.memory.probability_at(c)).sum()
                };
                mass(*a).partial_cmp(&mass(*b)).unwrap_or(Ordering::Equal)
            })
            .unwrap_or(Quadrant::NorthWest)
    }

    /// Whether we look like we are losing: fewer own ships afloat than the
    /// opponent. Gates the defensive jam install.
    fn under_pressure(&self, snap: &RoomSnapshot) -> bool {
        snap.side(self.me).ships_afloat.len() <= snap.side(self.me.opponent()).ships_afloat.len()
    }

    fn ability_ready(&self, snap: &RoomSnapshot, kind: AbilityKind) -> bool {
        snap.ability(self.me, kind).map_or(false, |state| state.ready())
    }

    fn unresolved_cells(&self) -> Vec<Coordinate> {
        let size = self.handle.snapshot().size;
        (0..size * size)
            .map(|i| Coordinate::new(i / size, i % size))
            .filter(|&coord| !self.memory.is_resolved(coord))
            .collect()
    }

    /// Submit the chosen action; on a stale decision fall through to the
    /// heuristic and then to the first unresolved cell.
    fn perform(&mut self, action: EngineAction) {
        let result = self.submit(&action);
        match result {
            Ok(()) => {}
            Err(GameError::Validation(err)) => {
                debug!(player = ?self.me, %err, ?action, "action rejected, falling back");
                let fallback = EngineAction::Attack(self.pick_cell());
                if self.submit(&fallback).is_err() {
                    if let Some(coord) = self.memory.first_unresolved() {
                        if let Err(err) = self.submit(&EngineAction::Attack(coord)) {
                            warn!(player = ?self.me, %err, "no legal action available");
                        }
                    }
                }
            }
            Err(err) => warn!(player = ?self.me, %err, "action failed"),
        }
    }

    fn submit(&self, action: &EngineAction) -> Result<(), GameError> {
        match *action {
            EngineAction::Attack(coord) => self.handle.attack(self.me, coord).map(drop),
            EngineAction::Nuke(coord) => self.handle.fire_nuke(self.me, coord).map(drop),
            EngineAction::Annihilate(coord, axis) => {
                self.handle.fire_annihilate(self.me, coord, axis).map(drop)
            }
            EngineAction::Quadrant(quadrant) => {
                self.handle.fire_quadrant(self.me, quadrant).map(drop)
            }
            EngineAction::Hacker => self.handle.hacker(self.me).map(drop),
            EngineAction::Scanner(coord) => self.handle.scanner(self.me, coord).map(drop),
            EngineAction::InstallJam => self.handle.install_jam(self.me),
            EngineAction::InstallCounter => self.handle.install_counter(self.me),
        }
    }
}

/// Resolve once the room's game has ended.
async fn game_ended(updates: &mut watch::Receiver<RoomSnapshot>) {
    loop {
        if updates.borrow().over() {
            return;
        }
        if updates.changed().await.is_err() {
            return;
        }
    }
}
