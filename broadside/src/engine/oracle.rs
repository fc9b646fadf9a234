//! The optional external strategy oracle.
//!
//! An oracle is a remote service that proposes one action for the current
//! turn. The engine tolerates it being absent, slow, or malformed: every
//! consultation races a hard timeout, a dropped future cancels the request,
//! and any proposal that fails vetting is discarded in favor of the local
//! heuristic.

use std::{future::Future, pin::Pin};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    ability::AbilityKind,
    board::Quadrant,
    room::{MoveRecord, Player, RoomSnapshot, SideView},
    ships::Axis,
};

/// A board view and context serialized for the oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleRequest {
    /// Side length of the boards.
    pub size: usize,
    /// The requesting player.
    pub player: Player,
    /// Redacted view of the opposing grid, as the requester sees it.
    pub enemy: SideView,
    /// Ability kinds the requester can still spend.
    pub abilities: Vec<AbilityKind>,
    /// Tail of the move log for context.
    pub recent_moves: Vec<MoveRecord>,
}

/// How many trailing log entries travel with a request.
const RECENT_MOVES: usize = 12;

impl OracleRequest {
    /// Build a request from the current snapshot.
    pub fn from_snapshot(snap: &RoomSnapshot, player: Player) -> Self {
        Self {
            size: snap.size,
            player,
            enemy: snap.side(player.opponent()).clone(),
            abilities: snap
                .side(player)
                .abilities
                .iter()
                .filter(|view| view.state.ready())
                .map(|view| view.kind)
                .collect(),
            recent_moves: snap
                .moves
                .iter()
                .rev()
                .take(RECENT_MOVES)
                .rev()
                .cloned()
                .collect(),
        }
    }
}

/// One action proposed by an oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OracleAction {
    Attack { row: usize, col: usize },
    Nuke { row: usize, col: usize },
    Annihilate { row: usize, col: usize, axis: Axis },
    Quadrant { quadrant: Quadrant },
    Hacker,
    Scanner { row: usize, col: usize },
    InstallJam,
    InstallCounter,
}

/// Why an oracle consultation produced nothing usable.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The oracle could not be reached.
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    /// The oracle answered with something that did not parse.
    #[error("oracle response malformed: {0}")]
    Malformed(String),
}

/// Future returned by an oracle consultation. Dropping it cancels the
/// request; a late response is discarded, never applied.
pub type OracleFuture = Pin<Box<dyn Future<Output = Result<OracleAction, OracleError>> + Send>>;

/// An external strategy oracle.
pub trait StrategyOracle: Send + Sync {
    /// Propose one action for the requester's turn.
    fn propose(&self, request: OracleRequest) -> OracleFuture;
}

/// HTTP oracle client: posts the request as JSON and expects one
/// [`OracleAction`] back.
#[cfg(feature = "http-oracle")]
pub struct HttpOracle {
    client: reqwest::Client,
    url: String,
}

#[cfg(feature = "http-oracle")]
impl HttpOracle {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Create a client from the `ORACLE_URL` environment variable, if set.
    pub fn from_env() -> Option<Self> {
        std::env::var("ORACLE_URL").ok().map(Self::new)
    }
}

#[cfg(feature = "http-oracle")]
impl StrategyOracle for HttpOracle {
    fn propose(&self, request: OracleRequest) -> OracleFuture {
        let client = self.client.clone();
        let url = self.url.clone();
        Box::pin(async move {
            let response = client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|err| OracleError::Unavailable(err.to_string()))?;
            if !response.status().is_success() {
                return Err(OracleError::Unavailable(format!(
                    "status {}",
                    response.status()
                )));
            }
            response
                .json::<OracleAction>()
                .await
                .map_err(|err| OracleError::Malformed(err.to_string()))
        })
    }
}
