//! Integration tests of the opponent decision engine: memory invariants,
//! run detection, oracle degradation, and full engine-vs-engine games.

use std::{sync::Arc, time::Duration};

use rand::{rngs::StdRng, SeedableRng};

use broadside::{
    engine::{
        generate_layout, Difficulty, EngineMemory, OracleAction, OracleFuture, OracleRequest,
        Phase, PlacementBias, StrategyOracle,
    },
    AbilityKind, Axis, Coordinate, EngineTuning, FleetPlacement, MoveKind, OpponentEngine,
    Player, RoomConfig, RoomHandle, RoomId, RoomRegistry, ShipClass, ShipSpot,
};

fn spot(class: ShipClass, row: usize, col: usize, axis: Axis) -> ShipSpot {
    ShipSpot {
        class,
        bow: Coordinate::new(row, col),
        axis,
    }
}

/// Battleship across (2,2)..(2,5); everything else out of the way.
fn run_scenario_plan() -> FleetPlacement {
    FleetPlacement::new(vec![
        spot(ShipClass::Battleship, 2, 2, Axis::Horizontal),
        spot(ShipClass::Cruiser, 0, 0, Axis::Horizontal),
        spot(ShipClass::Submarine, 4, 0, Axis::Horizontal),
        spot(ShipClass::Destroyer, 6, 0, Axis::Horizontal),
    ])
}

fn make_room(registry: &RoomRegistry, name: &str, plan: &FleetPlacement) -> Arc<RoomHandle> {
    registry
        .create(
            RoomId::from(name),
            RoomConfig::new(8).unwrap().with_seed(21),
            plan,
            plan,
            Player::P1,
        )
        .unwrap()
}

/// Two hits on the battleship, with filler moves from the other side.
fn script_two_hits(handle: &Arc<RoomHandle>) {
    handle.attack(Player::P1, Coordinate::new(2, 3)).unwrap();
    handle.attack(Player::P2, Coordinate::new(7, 7)).unwrap();
    handle.attack(Player::P1, Coordinate::new(2, 4)).unwrap();
    handle.attack(Player::P2, Coordinate::new(7, 6)).unwrap();
}

#[test]
fn two_collinear_hits_predict_both_extensions() {
    let registry = RoomRegistry::new();
    let handle = make_room(&registry, "pattern", &run_scenario_plan());
    script_two_hits(&handle);

    let tuning = EngineTuning::default();
    let memory = EngineMemory::rebuild(Player::P1, &handle.snapshot(), &tuning);

    assert_eq!(memory.phase(), Phase::Targeting);
    let segments = memory.segments();
    assert_eq!(segments.len(), 1);
    let seg = &segments[0];
    assert_eq!(seg.axis, Axis::Horizontal);
    assert_eq!(seg.cells, vec![Coordinate::new(2, 3), Coordinate::new(2, 4)]);
    let mut extensions = seg.extensions.clone();
    extensions.sort_by_key(|c| c.col);
    assert_eq!(
        extensions,
        vec![Coordinate::new(2, 2), Coordinate::new(2, 5)]
    );
    assert!((seg.confidence - tuning.extension_confidence).abs() < f64::EPSILON);
}

#[test]
fn probability_grid_is_nonnegative_and_zero_on_resolved_cells() {
    let registry = RoomRegistry::new();
    let handle = make_room(&registry, "grid", &run_scenario_plan());
    script_two_hits(&handle);

    let tuning = EngineTuning::default();
    let memory = EngineMemory::rebuild(Player::P1, &handle.snapshot(), &tuning);
    for (i, &p) in memory.probability().iter().enumerate() {
        let coord = Coordinate::new(i / 8, i % 8);
        assert!(p >= 0.0, "negative probability at {}", coord);
        if memory.is_resolved(coord) {
            assert_eq!(p, 0.0, "resolved cell {} must be zero", coord);
        }
    }
    // The predicted extensions carry real mass.
    assert!(memory.probability_at(Coordinate::new(2, 5)) > 0.0);
}

#[test]
fn memory_pickers_never_return_resolved_cells() {
    let registry = RoomRegistry::new();
    let handle = make_room(&registry, "pickers", &run_scenario_plan());
    script_two_hits(&handle);

    let tuning = EngineTuning::default();
    let memory = EngineMemory::rebuild(Player::P1, &handle.snapshot(), &tuning);
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..64 {
        let coord = memory.random_unresolved(&mut rng).unwrap();
        assert!(!memory.is_resolved(coord));
    }
    assert!(!memory.is_resolved(memory.best_cell().unwrap()));
    assert!(!memory.is_resolved(memory.parity_scan().unwrap()));
    assert!(!memory.is_resolved(memory.first_unresolved().unwrap()));
}

#[test]
fn rebuilding_from_the_log_matches_incremental_memory() {
    let registry = RoomRegistry::new();
    let handle = make_room(&registry, "rebuild", &run_scenario_plan());
    let tuning = EngineTuning::default();
    let mut incremental = EngineMemory::new(Player::P1, 8);

    handle.attack(Player::P1, Coordinate::new(2, 3)).unwrap();
    incremental.update(&handle.snapshot(), &tuning);
    handle.attack(Player::P2, Coordinate::new(7, 7)).unwrap();
    incremental.update(&handle.snapshot(), &tuning);
    handle.attack(Player::P1, Coordinate::new(2, 4)).unwrap();
    incremental.update(&handle.snapshot(), &tuning);
    handle.attack(Player::P2, Coordinate::new(7, 6)).unwrap();
    incremental.update(&handle.snapshot(), &tuning);

    let rebuilt = EngineMemory::rebuild(Player::P1, &handle.snapshot(), &tuning);
    assert_eq!(rebuilt.shots(), incremental.shots());
    assert_eq!(rebuilt.phase(), incremental.phase());
    assert_eq!(rebuilt.probability(), incremental.probability());
    assert_eq!(rebuilt.segments().len(), incremental.segments().len());
}

#[tokio::test(start_paused = true)]
async fn engine_short_circuits_a_run_with_annihilate() {
    let registry = RoomRegistry::new();
    let handle = make_room(&registry, "short", &run_scenario_plan());
    handle.grant(Player::P1, AbilityKind::Annihilate).unwrap();
    script_two_hits(&handle);

    let mut engine =
        OpponentEngine::new(Arc::clone(&handle), Player::P1, Difficulty::Hard).with_seed(5);
    let snap = handle.snapshot();
    engine.take_turn(&snap).await;

    let snap = handle.snapshot();
    let record = snap
        .moves
        .iter()
        .rev()
        .find(|record| record.actor == Player::P1)
        .unwrap();
    assert_eq!(record.kind, MoveKind::Annihilate);
    let aim = record.coords[0];
    assert!(
        aim == Coordinate::new(2, 2) || aim == Coordinate::new(2, 5),
        "annihilate must target a run extension, got {}",
        aim
    );
}

struct SilentOracle;

impl StrategyOracle for SilentOracle {
    fn propose(&self, _request: OracleRequest) -> OracleFuture {
        Box::pin(std::future::pending())
    }
}

struct WildOracle;

impl StrategyOracle for WildOracle {
    fn propose(&self, _request: OracleRequest) -> OracleFuture {
        Box::pin(async { Ok(OracleAction::Attack { row: 99, col: 99 }) })
    }
}

#[tokio::test(start_paused = true)]
async fn a_hung_oracle_times_out_and_the_engine_still_moves() {
    let registry = RoomRegistry::new();
    let handle = make_room(&registry, "hung-oracle", &run_scenario_plan());
    let mut tuning = EngineTuning::default();
    tuning.oracle_timeout = Duration::from_millis(50);
    // No abilities granted, so the chain always reaches the oracle rung.
    let mut engine = OpponentEngine::new(Arc::clone(&handle), Player::P1, Difficulty::Medium)
        .with_tuning(tuning)
        .with_seed(3)
        .with_oracle(Arc::new(SilentOracle));
    let before = handle.snapshot().moves.len();
    let snap = handle.snapshot();
    engine.take_turn(&snap).await;
    assert_eq!(handle.snapshot().moves.len(), before + 1);
}

#[tokio::test(start_paused = true)]
async fn an_illegal_oracle_proposal_is_discarded() {
    let registry = RoomRegistry::new();
    let handle = make_room(&registry, "wild-oracle", &run_scenario_plan());
    let mut engine = OpponentEngine::new(Arc::clone(&handle), Player::P1, Difficulty::Medium)
        .with_seed(3)
        .with_oracle(Arc::new(WildOracle));
    let snap = handle.snapshot();
    engine.take_turn(&snap).await;
    let snap = handle.snapshot();
    let record = snap.moves.last().unwrap();
    assert!(record.kind.is_attack());
    let coord = record.coords[0];
    assert!(coord.row < 8 && coord.col < 8);
}

#[tokio::test(start_paused = true)]
async fn engines_play_a_full_game_to_completion() {
    let registry = RoomRegistry::new();
    let mut rng = StdRng::seed_from_u64(9);
    let p1 = generate_layout(8, PlacementBias::Dispersed, &mut rng);
    let p2 = generate_layout(8, PlacementBias::EdgeHugging, &mut rng);
    let handle = registry
        .create(
            RoomId::from("duel"),
            RoomConfig::new(8).unwrap().with_seed(7),
            &p1,
            &p2,
            Player::P1,
        )
        .unwrap();
    for &kind in &[AbilityKind::Nuke, AbilityKind::Annihilate, AbilityKind::Jam] {
        handle.grant(Player::P1, kind).unwrap();
        handle.grant(Player::P2, kind).unwrap();
    }
    let hard = OpponentEngine::new(Arc::clone(&handle), Player::P1, Difficulty::Hard).with_seed(1);
    let easy = OpponentEngine::new(Arc::clone(&handle), Player::P2, Difficulty::Easy).with_seed(2);

    let played = tokio::time::timeout(Duration::from_secs(3600), async {
        tokio::join!(hard.run(), easy.run());
    })
    .await;
    assert!(played.is_ok(), "the game must finish");

    let snap = handle.snapshot();
    let verdict = snap.verdict.expect("someone must win");
    // Progress guarantee: the move count stays far below the spin bound.
    assert!(snap.moves.len() < 8 * 8 * 4, "too many moves: {}", snap.moves.len());
    // The winner is one of the players and the loser's fleet is gone.
    let loser = verdict.winner.opponent();
    assert!(snap.side(loser).ships_afloat.is_empty());
}

#[test]
fn generated_layouts_replay_into_legal_rooms_for_every_tier() {
    for &difficulty in &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
        for seed in 0..4 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = generate_layout(10, difficulty.placement_bias(), &mut rng);
            let registry = RoomRegistry::new();
            registry
                .create(
                    RoomId::from("layout"),
                    RoomConfig::new(10).unwrap(),
                    &plan,
                    &plan,
                    Player::P1,
                )
                .unwrap();
        }
    }
}
