//! The static catalog of ability kinds and their per-player lifecycle state.
//!
//! Ability kinds are a closed enum so resolution can match exhaustively;
//! adding or removing a kind is a compile-time-checked change.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of common-tier abilities a player may hold active and
/// unused at the same time.
pub const MAX_ACTIVE_COMMON: usize = 3;

/// Every special ability the game knows about.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Attack the targeted cell plus its four diagonal neighbors.
    Nuke,
    /// Attack the targeted cell, then both side cells along an axis.
    Annihilate,
    /// Reveal one random intact ship cell on the defender's grid.
    Hacker,
    /// Count ship cells in the 2x2 block anchored at the target.
    Scanner,
    /// Passive: fully absorb the next incoming attack.
    Jam,
    /// Passive: retaliate once after the next hit taken.
    Counter,
    /// Privileged: attack every cell of one board quadrant.
    Quadrant,
}

/// Category an ability kind belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum AbilityCategory {
    /// Fires shots at the defender's grid.
    Attack,
    /// Installs a passive interceptor on the owner's side.
    Defense,
    /// Reads state without mutating the defender's cells.
    Support,
    /// Attack-class but restricted to moderator-hosted rooms.
    Privileged,
}

impl AbilityKind {
    /// Every ability kind.
    pub const ALL: &'static [AbilityKind] = &[
        AbilityKind::Nuke,
        AbilityKind::Annihilate,
        AbilityKind::Hacker,
        AbilityKind::Scanner,
        AbilityKind::Jam,
        AbilityKind::Counter,
        AbilityKind::Quadrant,
    ];

    /// The category this kind belongs to.
    pub fn category(self) -> AbilityCategory {
        match self {
            AbilityKind::Nuke | AbilityKind::Annihilate => AbilityCategory::Attack,
            AbilityKind::Jam | AbilityKind::Counter => AbilityCategory::Defense,
            AbilityKind::Hacker | AbilityKind::Scanner => AbilityCategory::Support,
            AbilityKind::Quadrant => AbilityCategory::Privileged,
        }
    }

    /// Whether a grant of this kind counts toward the active-common cap.
    /// Privileged kinds bypass the cap.
    pub fn counts_toward_cap(self) -> bool {
        self.category() != AbilityCategory::Privileged
    }

    /// Whether this kind is installed as a passive rather than fired.
    pub fn installable(self) -> bool {
        self.category() == AbilityCategory::Defense
    }

    /// Display label recorded on cells this ability resolves.
    pub fn label(self) -> &'static str {
        match self {
            AbilityKind::Nuke => "nuke",
            AbilityKind::Annihilate => "annihilate",
            AbilityKind::Hacker => "hacker",
            AbilityKind::Scanner => "scanner",
            AbilityKind::Jam => "jam",
            AbilityKind::Counter => "counter",
            AbilityKind::Quadrant => "quadrant",
        }
    }
}

/// Lifecycle state of one granted ability. Granted abilities are strictly
/// single-use: once `used` is set the kind can never fire again this game.
/// Defense kinds pass through `installed` between granting and consumption.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
pub struct AbilityState {
    /// The ability was granted and not yet spent.
    pub active: bool,
    /// The ability has been consumed (fired, installed, or absorbed).
    pub used: bool,
    /// The passive is armed and waiting for its trigger.
    pub installed: bool,
}

impl AbilityState {
    fn granted() -> Self {
        Self {
            active: true,
            used: false,
            installed: false,
        }
    }

    /// Whether this ability may still be fired or installed.
    pub fn ready(&self) -> bool {
        self.active && !self.used
    }
}

/// Reason a grant was refused.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum GrantError {
    /// The kind was already granted this game.
    #[error("ability was already granted this game")]
    AlreadyGranted,
    /// The player already holds the maximum of active common abilities.
    #[error("too many common abilities active at once")]
    CapExceeded,
    /// The kind is restricted to moderator-hosted rooms.
    #[error("ability requires a moderated room")]
    RequiresModerator,
}

/// One player's granted abilities.
#[derive(Debug, Default, Clone)]
pub struct AbilityRack {
    states: HashMap<AbilityKind, AbilityState>,
}

impl AbilityRack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant an ability to this rack. Common-tier grants are refused once
    /// [`MAX_ACTIVE_COMMON`] of them are active and unused; privileged kinds
    /// bypass the cap but require a moderated room.
    pub fn grant(&mut self, kind: AbilityKind, moderated: bool) -> Result<(), GrantError> {
        if self.states.contains_key(&kind) {
            return Err(GrantError::AlreadyGranted);
        }
        if kind.category() == AbilityCategory::Privileged {
            if !moderated {
                return Err(GrantError::RequiresModerator);
            }
        } else if self.active_common() >= MAX_ACTIVE_COMMON {
            return Err(GrantError::CapExceeded);
        }
        self.states.insert(kind, AbilityState::granted());
        Ok(())
    }

    /// Number of common-tier abilities currently active and unused.
    pub fn active_common(&self) -> usize {
        self.states
            .iter()
            .filter(|(kind, state)| kind.counts_toward_cap() && state.ready())
            .count()
    }

    /// The state of the given kind, if it was ever granted.
    pub fn state(&self, kind: AbilityKind) -> Option<AbilityState> {
        self.states.get(&kind).copied()
    }

    /// Whether the given kind may be fired or installed right now.
    pub fn ready(&self, kind: AbilityKind) -> bool {
        self.states.get(&kind).map_or(false, AbilityState::ready)
    }

    /// Whether the given passive kind is currently armed.
    pub fn installed(&self, kind: AbilityKind) -> bool {
        self.states.get(&kind).map_or(false, |state| state.installed)
    }

    /// Consume a ready ability directly. Returns `false` if it was not ready.
    pub(crate) fn consume(&mut self, kind: AbilityKind) -> bool {
        match self.states.get_mut(&kind) {
            Some(state) if state.ready() => {
                state.used = true;
                true
            }
            _ => false,
        }
    }

    /// Install a ready passive. Returns `false` if it was not ready.
    pub(crate) fn install(&mut self, kind: AbilityKind) -> bool {
        match self.states.get_mut(&kind) {
            Some(state) if state.ready() && kind.installable() => {
                state.used = true;
                state.installed = true;
                true
            }
            _ => false,
        }
    }

    /// Disarm an installed passive after it triggers. The kind is consumed
    /// for the remainder of the game.
    pub(crate) fn trip(&mut self, kind: AbilityKind) -> bool {
        match self.states.get_mut(&kind) {
            Some(state) if state.installed => {
                state.installed = false;
                true
            }
            _ => false,
        }
    }

    /// Iterate the granted kinds and their states.
    pub fn iter(&self) -> impl Iterator<Item = (AbilityKind, AbilityState)> + '_ {
        self.states.iter().map(|(&kind, &state)| (kind, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_caps_active_common_at_three() {
        let mut rack = AbilityRack::new();
        rack.grant(AbilityKind::Nuke, false).unwrap();
        rack.grant(AbilityKind::Hacker, false).unwrap();
        rack.grant(AbilityKind::Jam, false).unwrap();
        assert_eq!(
            rack.grant(AbilityKind::Scanner, false).unwrap_err(),
            GrantError::CapExceeded
        );
        // Spending one frees a slot.
        assert!(rack.consume(AbilityKind::Nuke));
        rack.grant(AbilityKind::Scanner, false).unwrap();
    }

    #[test]
    fn privileged_bypasses_cap_but_needs_moderator() {
        let mut rack = AbilityRack::new();
        rack.grant(AbilityKind::Nuke, false).unwrap();
        rack.grant(AbilityKind::Hacker, false).unwrap();
        rack.grant(AbilityKind::Jam, false).unwrap();
        assert_eq!(
            rack.grant(AbilityKind::Quadrant, false).unwrap_err(),
            GrantError::RequiresModerator
        );
        rack.grant(AbilityKind::Quadrant, true).unwrap();
        assert!(rack.ready(AbilityKind::Quadrant));
    }

    #[test]
    fn regrant_is_refused_even_after_use() {
        let mut rack = AbilityRack::new();
        rack.grant(AbilityKind::Scanner, false).unwrap();
        assert!(rack.consume(AbilityKind::Scanner));
        assert_eq!(
            rack.grant(AbilityKind::Scanner, false).unwrap_err(),
            GrantError::AlreadyGranted
        );
    }

    #[test]
    fn passive_lifecycle_runs_to_terminal_consumed() {
        let mut rack = AbilityRack::new();
        rack.grant(AbilityKind::Jam, false).unwrap();
        assert!(rack.install(AbilityKind::Jam));
        assert!(rack.installed(AbilityKind::Jam));
        // Installed passives are no longer ready to fire again.
        assert!(!rack.ready(AbilityKind::Jam));
        assert!(rack.trip(AbilityKind::Jam));
        assert!(!rack.installed(AbilityKind::Jam));
        assert!(!rack.trip(AbilityKind::Jam));
    }

    #[test]
    fn only_defense_kinds_install() {
        let mut rack = AbilityRack::new();
        rack.grant(AbilityKind::Nuke, false).unwrap();
        assert!(!rack.install(AbilityKind::Nuke));
        assert!(rack.ready(AbilityKind::Nuke));
    }
}
