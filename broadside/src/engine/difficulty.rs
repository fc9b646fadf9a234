//! Difficulty tiers for the automated opponent.
//!
//! A tier bundles the knobs that make the engine feel stronger or weaker:
//! how often it spends abilities, how often it deliberately plays a
//! sub-optimal cell, how disciplined its follow-up around a fresh hit is,
//! how long it pretends to think, and how it likes to lay out its own fleet.

use std::{str::FromStr, time::Duration};

use rand::Rng;
use thiserror::Error;

/// Strength tier of the automated opponent.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// How a tier prefers to lay out its own fleet. Every bias still produces a
/// legal, buffered, in-bounds placement.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PlacementBias {
    /// Ships pushed toward the board edges.
    EdgeHugging,
    /// Ships gathered around a random anchor.
    Clustered,
    /// Ships spread out, avoiding predictable groupings.
    Dispersed,
}

impl Difficulty {
    /// Probability that an available ability is spent this turn at all.
    pub fn ability_use_chance(self) -> f64 {
        match self {
            Difficulty::Easy => 0.15,
            Difficulty::Medium => 0.35,
            Difficulty::Hard => 0.60,
        }
    }

    /// Probability of deliberately playing a random cell instead of the
    /// computed best one.
    pub fn mistake_chance(self) -> f64 {
        match self {
            Difficulty::Easy => 0.35,
            Difficulty::Medium => 0.12,
            Difficulty::Hard => 0.02,
        }
    }

    /// Probability of following the targeting heuristic around a fresh hit
    /// instead of wandering.
    pub fn adjacency_accuracy(self) -> f64 {
        match self {
            Difficulty::Easy => 0.55,
            Difficulty::Medium => 0.80,
            Difficulty::Hard => 0.97,
        }
    }

    /// Simulated think time before acting, jittered per turn.
    pub fn think_delay(self, rng: &mut impl Rng) -> Duration {
        let (lo, hi) = match self {
            Difficulty::Easy => (400, 1100),
            Difficulty::Medium => (250, 800),
            Difficulty::Hard => (150, 500),
        };
        Duration::from_millis(rng.gen_range(lo, hi))
    }

    /// The fleet-layout bias this tier places with.
    pub fn placement_bias(self) -> PlacementBias {
        match self {
            Difficulty::Easy => PlacementBias::EdgeHugging,
            Difficulty::Medium => PlacementBias::Clustered,
            Difficulty::Hard => PlacementBias::Dispersed,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Error parsing a difficulty name.
#[derive(Debug, Error)]
#[error("unknown difficulty {0:?}, expected easy, medium, or hard")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "normal" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ParseDifficultyError(other.to_owned())),
        }
    }
}
