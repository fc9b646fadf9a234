//! Explicit registry of live rooms.
//!
//! The registry replaces ambient per-room globals: it is an owned object,
//! passed by reference to whatever drives games, with explicit create,
//! lookup, and dispose lifecycle. Each room is wrapped in a [`RoomHandle`]
//! that serializes every mutation through one writer and publishes a fresh
//! [`RoomSnapshot`] to subscribers after each commit.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::{
    ability::AbilityKind,
    board::{Coordinate, Quadrant},
    config::RoomConfig,
    room::{
        ActionReport, GameError, Player, Reveal, Room, RoomSnapshot, Scan, SetupError,
        StateConflict,
    },
    ships::{Axis, FleetPlacement},
};

/// Identifier of one room, as chosen by its creator.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Error creating a room.
#[derive(Debug, Error)]
pub enum CreateError {
    #[error(transparent)]
    Conflict(#[from] StateConflict),

    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Shared handle to one live room.
///
/// All mutation funnels through [`apply`][Self::apply]-style wrappers that
/// hold the room lock for the whole resolution, so the turn-token check and
/// the board mutation commit together: a stale caller (for example a
/// decision made against an old snapshot) fails validation instead of
/// clobbering newer state.
pub struct RoomHandle {
    id: RoomId,
    inner: Mutex<Room>,
    updates: watch::Sender<RoomSnapshot>,
    /// Keeps the channel open while no outside subscriber exists.
    _keepalive: watch::Receiver<RoomSnapshot>,
}

impl RoomHandle {
    fn new(id: RoomId, room: Room) -> Arc<Self> {
        let snapshot = room.snapshot(id.clone());
        let (updates, keepalive) = watch::channel(snapshot);
        Arc::new(Self {
            id,
            inner: Mutex::new(room),
            updates,
            _keepalive: keepalive,
        })
    }

    /// The room's id.
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// Subscribe to this room's snapshot stream. The receiver always holds
    /// the latest snapshot; dropping it unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<RoomSnapshot> {
        self.updates.subscribe()
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> RoomSnapshot {
        self.updates.borrow().clone()
    }

    /// Read access to the room under the lock.
    pub fn with_room<T>(&self, f: impl FnOnce(&Room) -> T) -> T {
        let room = self.inner.lock().expect("room lock poisoned");
        f(&room)
    }

    /// Resolve a plain attack. See [`Room::attack`].
    pub fn attack(&self, actor: Player, target: Coordinate) -> Result<ActionReport, GameError> {
        self.apply(|room| room.attack(actor, target))
    }

    /// Fire the NUKE pattern. See [`Room::fire_nuke`].
    pub fn fire_nuke(&self, actor: Player, center: Coordinate) -> Result<ActionReport, GameError> {
        self.apply(|room| room.fire_nuke(actor, center))
    }

    /// Fire the ANNIHILATE pattern. See [`Room::fire_annihilate`].
    pub fn fire_annihilate(
        &self,
        actor: Player,
        middle: Coordinate,
        axis: Axis,
    ) -> Result<ActionReport, GameError> {
        self.apply(|room| room.fire_annihilate(actor, middle, axis))
    }

    /// Fire the privileged quadrant wipe. See [`Room::fire_quadrant`].
    pub fn fire_quadrant(&self, actor: Player, quadrant: Quadrant) -> Result<ActionReport, GameError> {
        self.apply(|room| room.fire_quadrant(actor, quadrant))
    }

    /// Reveal one intact ship cell. See [`Room::hacker`].
    pub fn hacker(&self, actor: Player) -> Result<Reveal, GameError> {
        self.apply(|room| room.hacker(actor))
    }

    /// Scan a 2x2 block. See [`Room::scanner`].
    pub fn scanner(&self, actor: Player, anchor: Coordinate) -> Result<Scan, GameError> {
        self.apply(|room| room.scanner(actor, anchor))
    }

    /// Arm the jam passive. See [`Room::install_jam`].
    pub fn install_jam(&self, actor: Player) -> Result<(), GameError> {
        self.apply(|room| room.install_jam(actor))
    }

    /// Arm the counter passive. See [`Room::install_counter`].
    pub fn install_counter(&self, actor: Player) -> Result<(), GameError> {
        self.apply(|room| room.install_counter(actor))
    }

    /// Grant an ability. See [`Room::grant`].
    pub fn grant(&self, to: Player, kind: AbilityKind) -> Result<(), GameError> {
        self.apply(|room| room.grant(to, kind))
    }

    /// Concede the game. See [`Room::surrender`].
    pub fn surrender(&self, actor: Player) -> Result<(), GameError> {
        self.apply(|room| room.surrender(actor))
    }

    fn apply<T>(&self, f: impl FnOnce(&mut Room) -> Result<T, GameError>) -> Result<T, GameError> {
        let mut room = self.inner.lock().expect("room lock poisoned");
        let out = f(&mut room)?;
        // Publish only after a successful commit. Send only fails with no
        // receivers, which the keepalive receiver rules out.
        let _ = self.updates.send(room.snapshot(self.id.clone()));
        Ok(out)
    }
}

/// Registry of live rooms, keyed by [`RoomId`].
#[derive(Default)]
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomId, Arc<RoomHandle>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a room from completed placement plans and register it. Fails
    /// if a room with the same id already exists.
    pub fn create(
        &self,
        id: RoomId,
        config: RoomConfig,
        p1: &FleetPlacement,
        p2: &FleetPlacement,
        first: Player,
    ) -> Result<Arc<RoomHandle>, CreateError> {
        let mut rooms = self.rooms.lock().expect("registry lock poisoned");
        if rooms.contains_key(&id) {
            return Err(StateConflict::RoomExists(id).into());
        }
        let room = Room::new(config, p1, p2, first)?;
        let handle = RoomHandle::new(id.clone(), room);
        rooms.insert(id.clone(), Arc::clone(&handle));
        info!(%id, size = config.board_size, "room created");
        Ok(handle)
    }

    /// Look up a live room.
    pub fn get(&self, id: &RoomId) -> Result<Arc<RoomHandle>, StateConflict> {
        self.rooms
            .lock()
            .expect("registry lock poisoned")
            .get(id)
            .cloned()
            .ok_or_else(|| StateConflict::RoomNotFound(id.clone()))
    }

    /// Subscribe to a live room's snapshot stream.
    pub fn subscribe(&self, id: &RoomId) -> Result<watch::Receiver<RoomSnapshot>, StateConflict> {
        Ok(self.get(id)?.subscribe())
    }

    /// Drop a room from the registry. Existing handles stay usable until
    /// released; returns whether the room was present.
    pub fn dispose(&self, id: &RoomId) -> bool {
        let removed = self
            .rooms
            .lock()
            .expect("registry lock poisoned")
            .remove(id)
            .is_some();
        if removed {
            debug!(%id, "room disposed");
        }
        removed
    }

    /// Ids of every live room.
    pub fn ids(&self) -> Vec<RoomId> {
        self.rooms
            .lock()
            .expect("registry lock poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        board::Coordinate,
        ships::{Axis, ShipClass, ShipSpot},
    };

    fn plan() -> FleetPlacement {
        FleetPlacement::new(vec![
            ShipSpot {
                class: ShipClass::Battleship,
                bow: Coordinate::new(0, 0),
                axis: Axis::Horizontal,
            },
            ShipSpot {
                class: ShipClass::Cruiser,
                bow: Coordinate::new(2, 0),
                axis: Axis::Horizontal,
            },
            ShipSpot {
                class: ShipClass::Submarine,
                bow: Coordinate::new(4, 0),
                axis: Axis::Horizontal,
            },
            ShipSpot {
                class: ShipClass::Destroyer,
                bow: Coordinate::new(6, 0),
                axis: Axis::Horizontal,
            },
        ])
    }

    fn config() -> RoomConfig {
        RoomConfig::new(8).unwrap().with_seed(11)
    }

    #[test]
    fn create_get_dispose_lifecycle() {
        let registry = RoomRegistry::new();
        let id = RoomId::from("alpha");
        registry
            .create(id.clone(), config(), &plan(), &plan(), Player::P1)
            .unwrap();
        assert!(registry.get(&id).is_ok());
        assert!(registry.dispose(&id));
        assert!(matches!(
            registry.get(&id),
            Err(StateConflict::RoomNotFound(_))
        ));
        assert!(!registry.dispose(&id));
    }

    #[test]
    fn duplicate_create_is_a_conflict() {
        let registry = RoomRegistry::new();
        let id = RoomId::from("alpha");
        registry
            .create(id.clone(), config(), &plan(), &plan(), Player::P1)
            .unwrap();
        assert!(matches!(
            registry.create(id.clone(), config(), &plan(), &plan(), Player::P1),
            Err(CreateError::Conflict(StateConflict::RoomExists(_)))
        ));
    }

    #[test]
    fn commits_publish_snapshots() {
        let registry = RoomRegistry::new();
        let id = RoomId::from("alpha");
        let handle = registry
            .create(id.clone(), config(), &plan(), &plan(), Player::P1)
            .unwrap();
        let rx = registry.subscribe(&id).unwrap();
        assert_eq!(rx.borrow().turn, Player::P1);
        handle.attack(Player::P1, Coordinate::new(7, 7)).unwrap();
        let snap = rx.borrow();
        assert_eq!(snap.turn, Player::P2);
        assert_eq!(snap.moves.len(), 1);
    }

    #[test]
    fn failed_actions_do_not_publish() {
        let registry = RoomRegistry::new();
        let id = RoomId::from("alpha");
        let handle = registry
            .create(id.clone(), config(), &plan(), &plan(), Player::P1)
            .unwrap();
        let rx = registry.subscribe(&id).unwrap();
        // Out of turn: rejected before any mutation, no snapshot published.
        assert!(handle.attack(Player::P2, Coordinate::new(0, 0)).is_err());
        assert!(!rx.has_changed().unwrap());
    }
}
