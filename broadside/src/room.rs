//! A room owns one full game: both players' boards and ability racks, the
//! turn token, and the append-only move log. Every resolution entry point
//! lives here.
//!
//! Control flow for an incoming action: preconditions are validated without
//! mutation, then the defender's interception layer gets a chance to absorb
//! the action, then the action resolves against the defender's grid, the
//! move log is appended, the turn token advances, and the win checker runs.
//! A successful hit additionally arms the defender's counter retaliation
//! before control returns to the caller.

use std::time::SystemTime;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    ability::{AbilityKind, AbilityRack},
    board::{Board, BoardSetup, Coordinate, Quadrant, ShotResult},
    config::RoomConfig,
    ships::{Axis, FleetPlacement},
};

pub use self::{
    errors::{GameError, SetupError, StateConflict, ValidationError},
    record::{MoveKind, MoveOutcome, MoveRecord},
    snapshot::{AbilityView, CellView, RoomSnapshot, SideView},
};

mod errors;
mod record;
mod snapshot;

/// Player ID for a two-party room. Either `P1` or `P2`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Player {
    P1,
    P2,
}

impl Player {
    /// Both players, in turn order.
    pub const BOTH: [Player; 2] = [Player::P1, Player::P2];

    /// Get the opponent of this player.
    pub fn opponent(self) -> Self {
        match self {
            Player::P1 => Player::P2,
            Player::P2 => Player::P1,
        }
    }

    /// Index of this player in per-side arrays.
    pub fn index(self) -> usize {
        match self {
            Player::P1 => 0,
            Player::P2 => 1,
        }
    }
}

/// How a finished game was decided.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum VictoryKind {
    /// Every ship cell of the loser was hit.
    Elimination,
    /// The loser conceded.
    Surrender,
}

/// The recorded end of a game. Once set, the turn token is frozen and every
/// further action fails validation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub winner: Player,
    pub reason: VictoryKind,
}

/// One resolved shot of a salvo.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Shot {
    pub coord: Coordinate,
    pub result: ShotResult,
}

/// Everything an attack-class action did to the defender's grid.
#[derive(Debug, Clone)]
pub struct Salvo {
    /// The shots resolved, in firing order.
    pub shots: Vec<Shot>,
    /// A counter retaliation fired back at the actor, if one triggered.
    pub counter: Option<Shot>,
    /// The game's verdict after this action, if it ended the game.
    pub verdict: Option<Verdict>,
}

impl Salvo {
    /// Number of shots that struck a ship.
    pub fn hits(&self) -> usize {
        self.shots.iter().filter(|shot| shot.result.is_hit()).count()
    }
}

/// Outcome of an attack-class action. Callers must distinguish an
/// interception from both success and hard failure: the attacker's resource
/// is consumed either way, but an intercepted action resolved no cells and
/// returned the turn to the defender.
#[derive(Debug, Clone)]
pub enum ActionReport {
    /// The action resolved against the defender's grid.
    Resolved(Salvo),
    /// The action was absorbed by the defender's installed jam.
    Intercepted,
}

impl ActionReport {
    pub fn is_intercepted(&self) -> bool {
        matches!(self, ActionReport::Intercepted)
    }

    /// The resolved salvo, unless the action was intercepted.
    pub fn salvo(&self) -> Option<&Salvo> {
        match self {
            ActionReport::Resolved(salvo) => Some(salvo),
            ActionReport::Intercepted => None,
        }
    }
}

/// Result payload of a reconnaissance reveal.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Reveal {
    /// The revealed intact ship cell, or `None` when none existed.
    pub cell: Option<Coordinate>,
}

/// Result payload of a block scan.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Scan {
    /// Ship-occupied cells in the scanned block.
    pub ships: usize,
}

/// One player's half of the room.
#[derive(Debug)]
struct Side {
    board: Board,
    abilities: AbilityRack,
}

/// A single game room. All mutation goes through the resolution entry
/// points, which validate the turn token before touching any state; callers
/// that share a room across tasks must serialize access through one writer
/// (see [`RoomHandle`][crate::registry::RoomHandle]).
#[derive(Debug)]
pub struct Room {
    config: RoomConfig,
    sides: [Side; 2],
    turn: Player,
    verdict: Option<Verdict>,
    moves: Vec<MoveRecord>,
    rng: StdRng,
}

impl Room {
    /// Build a room from completed placement plans for both players.
    pub fn new(
        config: RoomConfig,
        p1: &FleetPlacement,
        p2: &FleetPlacement,
        first: Player,
    ) -> Result<Self, SetupError> {
        let mut sides = Vec::with_capacity(2);
        for (player, plan) in Player::BOTH.iter().copied().zip([p1, p2].iter().copied()) {
            let setup = BoardSetup::with_plan(config.board_size, plan)?;
            let board = setup
                .start()
                .map_err(|_| SetupError::IncompleteFleet(player))?;
            sides.push(Side {
                board,
                abilities: AbilityRack::new(),
            });
        }
        let mut sides = sides.into_iter();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            sides: [
                sides.next().expect("side missing"),
                sides.next().expect("side missing"),
            ],
            turn: first,
            verdict: None,
            moves: Vec::new(),
            rng,
        })
    }

    /// The room's fixed configuration.
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Side length of both boards.
    pub fn size(&self) -> usize {
        self.config.board_size
    }

    /// The player currently permitted to act.
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// The game's verdict, if it has ended.
    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    /// The append-only move log.
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// The given player's board.
    pub fn board(&self, player: Player) -> &Board {
        &self.sides[player.index()].board
    }

    /// The given player's granted abilities.
    pub fn rack(&self, player: Player) -> &AbilityRack {
        &self.sides[player.index()].abilities
    }

    /// Grant an ability to a player. Common-tier grants are capped; the
    /// privileged kind requires a moderated room.
    pub fn grant(&mut self, to: Player, kind: AbilityKind) -> Result<(), GameError> {
        if self.verdict.is_some() {
            return Err(ValidationError::GameOver.into());
        }
        let moderated = self.config.moderated;
        self.sides[to.index()]
            .abilities
            .grant(kind, moderated)
            .map_err(|err| ValidationError::from_grant(kind, err))?;
        debug!(?to, ?kind, "ability granted");
        Ok(())
    }

    /// Resolve a plain single-cell attack by `actor` against the opponent.
    pub fn attack(&mut self, actor: Player, target: Coordinate) -> Result<ActionReport, GameError> {
        self.ensure_live(actor)?;
        let defender = actor.opponent();
        match self.sides[defender.index()].board.cell(target) {
            None => return Err(ValidationError::OutOfBounds(target).into()),
            Some(cell) if cell.resolved() => {
                return Err(ValidationError::AlreadyResolved(target).into())
            }
            Some(_) => {}
        }
        if self.intercept(actor, None, vec![target]) {
            return Ok(ActionReport::Intercepted);
        }
        let result = self.sides[defender.index()]
            .board
            .resolve(target, "attack")
            .map_err(ValidationError::from_shot)?;
        debug!(?actor, %target, hit = result.is_hit(), "attack resolved");
        self.push_shots_record(MoveKind::Attack, actor, vec![target], &[Shot { coord: target, result }]);
        self.advance_turn(actor);
        self.check_victory(actor);
        let counter = if result.is_hit() {
            self.try_counter(actor)
        } else {
            None
        };
        Ok(ActionReport::Resolved(Salvo {
            shots: vec![Shot { coord: target, result }],
            counter,
            verdict: self.verdict,
        }))
    }

    /// Fire the NUKE pattern: the center cell plus its four diagonal
    /// neighbors. Pattern members that fall outside the board or were
    /// already resolved are silently skipped.
    pub fn fire_nuke(&mut self, actor: Player, center: Coordinate) -> Result<ActionReport, GameError> {
        self.ensure_live(actor)?;
        self.ensure_ready(actor, AbilityKind::Nuke)?;
        let defender = actor.opponent();
        if self.sides[defender.index()].board.cell(center).is_none() {
            return Err(ValidationError::OutOfBounds(center).into());
        }
        let targets: Vec<Coordinate> = std::iter::once(center)
            .chain(center.diagonal())
            .filter(|&coord| self.unresolved_cell(defender, coord))
            .collect();
        self.fire_ability(actor, AbilityKind::Nuke, vec![center], targets)
    }

    /// Fire the ANNIHILATE pattern: the middle cell first, then the two side
    /// cells along `axis`, each independent of the middle's outcome. Side
    /// cells outside the board or already resolved are skipped, as is a
    /// middle cell that was already resolved.
    pub fn fire_annihilate(
        &mut self,
        actor: Player,
        middle: Coordinate,
        axis: Axis,
    ) -> Result<ActionReport, GameError> {
        self.ensure_live(actor)?;
        self.ensure_ready(actor, AbilityKind::Annihilate)?;
        let defender = actor.opponent();
        if self.sides[defender.index()].board.cell(middle).is_none() {
            return Err(ValidationError::OutOfBounds(middle).into());
        }
        let (dr, dc) = axis.step();
        let sides = [middle.offset(-dr, -dc), middle.offset(dr, dc)];
        let targets: Vec<Coordinate> = std::iter::once(middle)
            .chain(sides.iter().flatten().copied())
            .filter(|&coord| self.unresolved_cell(defender, coord))
            .collect();
        self.fire_ability(actor, AbilityKind::Annihilate, vec![middle], targets)
    }

    /// Fire the privileged quadrant wipe: every unresolved cell of one board
    /// quadrant. Only grantable in moderated rooms.
    pub fn fire_quadrant(
        &mut self,
        actor: Player,
        quadrant: Quadrant,
    ) -> Result<ActionReport, GameError> {
        self.ensure_live(actor)?;
        self.ensure_ready(actor, AbilityKind::Quadrant)?;
        let defender = actor.opponent();
        let targets: Vec<Coordinate> = quadrant
            .cells(self.size())
            .filter(|&coord| self.unresolved_cell(defender, coord))
            .collect();
        self.fire_ability(actor, AbilityKind::Quadrant, Vec::new(), targets)
    }

    /// Reveal one uniformly random intact ship cell on the defender's grid.
    /// Succeeds with no cell when none exists.
    pub fn hacker(&mut self, actor: Player) -> Result<Reveal, GameError> {
        self.ensure_live(actor)?;
        self.ensure_ready(actor, AbilityKind::Hacker)?;
        let defender = actor.opponent();
        let found = self.sides[defender.index()]
            .board
            .random_intact_ship_cell(&mut self.rng);
        if let Some(coord) = found {
            self.sides[defender.index()].board.mark_revealed(coord);
        }
        self.sides[actor.index()].abilities.consume(AbilityKind::Hacker);
        debug!(?actor, revealed = ?found, "hacker resolved");
        self.push_record(
            MoveKind::Hacker,
            actor,
            found.into_iter().collect(),
            MoveOutcome::Reveal {
                found: found.is_some(),
            },
        );
        self.advance_turn(actor);
        Ok(Reveal { cell: found })
    }

    /// Count ship cells in the 2x2 block anchored at `anchor` on the
    /// defender's grid, clipped to the board. Attacks nothing.
    pub fn scanner(&mut self, actor: Player, anchor: Coordinate) -> Result<Scan, GameError> {
        self.ensure_live(actor)?;
        self.ensure_ready(actor, AbilityKind::Scanner)?;
        let defender = actor.opponent();
        if self.sides[defender.index()].board.cell(anchor).is_none() {
            return Err(ValidationError::OutOfBounds(anchor).into());
        }
        let ships = self.sides[defender.index()].board.scan_block(anchor);
        self.sides[actor.index()].abilities.consume(AbilityKind::Scanner);
        debug!(?actor, %anchor, ships, "scanner resolved");
        self.push_record(
            MoveKind::Scanner,
            actor,
            vec![anchor],
            MoveOutcome::Scan { ships },
        );
        self.advance_turn(actor);
        Ok(Scan { ships })
    }

    /// Arm the jam passive: the next attack-class action against the
    /// installer is fully absorbed.
    pub fn install_jam(&mut self, actor: Player) -> Result<(), GameError> {
        self.install(actor, AbilityKind::Jam, MoveKind::JamInstall)
    }

    /// Arm the counter passive: the first hit the installer takes afterwards
    /// triggers one retaliatory hit on the attacker's grid.
    pub fn install_counter(&mut self, actor: Player) -> Result<(), GameError> {
        self.install(actor, AbilityKind::Counter, MoveKind::CounterInstall)
    }

    /// Concede the game. Allowed out of turn; the opponent is recorded as
    /// the winner.
    pub fn surrender(&mut self, actor: Player) -> Result<(), GameError> {
        if self.verdict.is_some() {
            return Err(ValidationError::GameOver.into());
        }
        self.verdict = Some(Verdict {
            winner: actor.opponent(),
            reason: VictoryKind::Surrender,
        });
        info!(?actor, "player surrendered");
        self.push_record(MoveKind::Surrender, actor, Vec::new(), MoveOutcome::Conceded);
        Ok(())
    }

    fn install(
        &mut self,
        actor: Player,
        kind: AbilityKind,
        record: MoveKind,
    ) -> Result<(), GameError> {
        self.ensure_live(actor)?;
        self.ensure_ready(actor, kind)?;
        if !self.sides[actor.index()].abilities.install(kind) {
            return Err(ValidationError::AbilityUnavailable(kind).into());
        }
        info!(?actor, ?kind, "passive installed");
        self.push_record(record, actor, Vec::new(), MoveOutcome::Installed);
        self.advance_turn(actor);
        Ok(())
    }

    /// Shared tail of every attack-pattern ability: interception check,
    /// shot resolution, consumption, record, turn advance, win check, and
    /// the counter hook.
    fn fire_ability(
        &mut self,
        actor: Player,
        kind: AbilityKind,
        aim: Vec<Coordinate>,
        targets: Vec<Coordinate>,
    ) -> Result<ActionReport, GameError> {
        if self.intercept(actor, Some(kind), aim.clone()) {
            return Ok(ActionReport::Intercepted);
        }
        let defender = actor.opponent();
        let mut shots = Vec::with_capacity(targets.len());
        for coord in targets {
            // Targets were pre-filtered to in-bounds, unresolved cells.
            let result = self.sides[defender.index()]
                .board
                .resolve(coord, kind.label())
                .map_err(ValidationError::from_shot)?;
            shots.push(Shot { coord, result });
        }
        self.sides[actor.index()].abilities.consume(kind);
        debug!(?actor, ?kind, shots = shots.len(), "ability resolved");
        let record = match kind {
            AbilityKind::Nuke => MoveKind::Nuke,
            AbilityKind::Annihilate => MoveKind::Annihilate,
            AbilityKind::Quadrant => MoveKind::Quadrant,
            _ => unreachable!("not an attack-pattern ability"),
        };
        self.push_shots_record(record, actor, aim, &shots);
        self.advance_turn(actor);
        self.check_victory(actor);
        let counter = if shots.iter().any(|shot| shot.result.is_hit()) {
            self.try_counter(actor)
        } else {
            None
        };
        Ok(ActionReport::Resolved(Salvo {
            shots,
            counter,
            verdict: self.verdict,
        }))
    }

    /// The defender's interception hook. Returns true when an installed jam
    /// absorbed the action: the actor's ability (if any) is consumed, the
    /// jam is consumed, and the turn token returns to the jam's installer.
    fn intercept(&mut self, actor: Player, ability: Option<AbilityKind>, aim: Vec<Coordinate>) -> bool {
        let defender = actor.opponent();
        if !self.sides[defender.index()].abilities.installed(AbilityKind::Jam) {
            return false;
        }
        if let Some(kind) = ability {
            self.sides[actor.index()].abilities.consume(kind);
        }
        self.sides[defender.index()].abilities.trip(AbilityKind::Jam);
        info!(?actor, ?defender, "attack absorbed by jam");
        self.push_record(MoveKind::Intercepted, actor, aim, MoveOutcome::Blocked);
        self.turn = defender;
        true
    }

    /// The counter retaliation hook, run after a resolved action that hit
    /// the installer's grid. Fires at most once per game and never after the
    /// game has ended; does not change whose turn it is.
    fn try_counter(&mut self, actor: Player) -> Option<Shot> {
        let defender = actor.opponent();
        if self.verdict.is_some()
            || !self.sides[defender.index()]
                .abilities
                .installed(AbilityKind::Counter)
        {
            return None;
        }
        let target = self.sides[actor.index()]
            .board
            .random_intact_ship_cell(&mut self.rng)?;
        let result = self.sides[actor.index()]
            .board
            .resolve(target, AbilityKind::Counter.label())
            .ok()?;
        self.sides[defender.index()].abilities.trip(AbilityKind::Counter);
        info!(?defender, %target, "counter retaliation fired");
        self.push_shots_record(
            MoveKind::CounterStrike,
            defender,
            vec![target],
            &[Shot { coord: target, result }],
        );
        self.check_victory(defender);
        Some(Shot { coord: target, result })
    }

    fn ensure_live(&self, actor: Player) -> Result<(), ValidationError> {
        if self.verdict.is_some() {
            Err(ValidationError::GameOver)
        } else if self.turn != actor {
            Err(ValidationError::OutOfTurn)
        } else {
            Ok(())
        }
    }

    fn ensure_ready(&self, actor: Player, kind: AbilityKind) -> Result<(), ValidationError> {
        if self.sides[actor.index()].abilities.ready(kind) {
            Ok(())
        } else {
            Err(ValidationError::AbilityUnavailable(kind))
        }
    }

    fn unresolved_cell(&self, side: Player, coord: Coordinate) -> bool {
        matches!(
            self.sides[side.index()].board.cell(coord),
            Some(cell) if !cell.resolved()
        )
    }

    /// Advance the turn token to the actor's opponent. Frozen once the game
    /// is over.
    fn advance_turn(&mut self, actor: Player) {
        if self.verdict.is_none() {
            self.turn = actor.opponent();
        }
    }

    /// Mark the game over if the actor's opponent has no surviving ship
    /// cells.
    fn check_victory(&mut self, actor: Player) {
        if self.verdict.is_none() && self.sides[actor.opponent().index()].board.defeated() {
            self.verdict = Some(Verdict {
                winner: actor,
                reason: VictoryKind::Elimination,
            });
            info!(winner = ?actor, "game over");
        }
    }

    fn push_shots_record(
        &mut self,
        kind: MoveKind,
        actor: Player,
        coords: Vec<Coordinate>,
        shots: &[Shot],
    ) {
        let (hits, misses) = shots.iter().partition::<Vec<&Shot>, _>(|shot| shot.result.is_hit());
        self.push_record(
            kind,
            actor,
            coords,
            MoveOutcome::Shots {
                hits: hits.into_iter().map(|shot| shot.coord).collect(),
                misses: misses.into_iter().map(|shot| shot.coord).collect(),
            },
        );
    }

    fn push_record(
        &mut self,
        kind: MoveKind,
        actor: Player,
        coords: Vec<Coordinate>,
        outcome: MoveOutcome,
    ) {
        self.moves.push(MoveRecord {
            kind,
            actor,
            coords,
            outcome,
            at: SystemTime::now(),
        });
    }
}
