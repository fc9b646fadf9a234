//! End-to-end tests of the resolution engine: plain attacks, pattern
//! abilities, support abilities, passive interception, and win handling.

use broadside::{
    AbilityKind, ActionReport, Axis, Coordinate, FleetPlacement, GameError, MoveKind, Player,
    Quadrant, Room, RoomConfig, ShipClass, ShipSpot, ShotMark, ValidationError, VictoryKind,
};

fn spot(class: ShipClass, row: usize, col: usize, axis: Axis) -> ShipSpot {
    ShipSpot {
        class,
        bow: Coordinate::new(row, col),
        axis,
    }
}

/// Fleet along the left columns of an 8x8 board. Cell (3,3) and the whole
/// right half stay empty.
fn plan() -> FleetPlacement {
    FleetPlacement::new(vec![
        spot(ShipClass::Battleship, 0, 0, Axis::Horizontal),
        spot(ShipClass::Cruiser, 2, 0, Axis::Horizontal),
        spot(ShipClass::Submarine, 4, 0, Axis::Horizontal),
        spot(ShipClass::Destroyer, 6, 0, Axis::Horizontal),
    ])
}

fn room() -> Room {
    Room::new(
        RoomConfig::new(8).unwrap().with_seed(42),
        &plan(),
        &plan(),
        Player::P1,
    )
    .unwrap()
}

fn moderated_room() -> Room {
    Room::new(
        RoomConfig::new(8).unwrap().moderated().with_seed(42),
        &plan(),
        &plan(),
        Player::P1,
    )
    .unwrap()
}

fn coords(shots: &[broadside::Shot]) -> Vec<Coordinate> {
    shots.iter().map(|shot| shot.coord).collect()
}

#[test]
fn attack_on_empty_cell_misses_and_flips_turn() {
    let mut room = room();
    let report = room.attack(Player::P1, Coordinate::new(3, 3)).unwrap();
    let salvo = report.salvo().expect("not intercepted");
    assert_eq!(salvo.shots.len(), 1);
    assert!(!salvo.shots[0].result.is_hit());
    assert_eq!(room.turn(), Player::P2);
    assert_eq!(room.moves().len(), 1);
    assert_eq!(room.moves()[0].kind, MoveKind::Attack);
}

#[test]
fn resolved_cells_reject_further_attacks_without_logging() {
    let mut room = room();
    room.attack(Player::P1, Coordinate::new(3, 3)).unwrap();
    room.attack(Player::P2, Coordinate::new(3, 3)).unwrap();
    let logged = room.moves().len();
    let err = room.attack(Player::P1, Coordinate::new(3, 3)).unwrap_err();
    assert_eq!(
        err,
        GameError::Validation(ValidationError::AlreadyResolved(Coordinate::new(3, 3)))
    );
    assert_eq!(room.moves().len(), logged);
}

#[test]
fn acting_out_of_turn_is_rejected_before_mutation() {
    let mut room = room();
    let err = room.attack(Player::P2, Coordinate::new(0, 0)).unwrap_err();
    assert_eq!(err, GameError::Validation(ValidationError::OutOfTurn));
    assert!(room.moves().is_empty());
    assert!(!room.board(Player::P1).cell(Coordinate::new(0, 0)).unwrap().resolved());
}

#[test]
fn out_of_bounds_attacks_are_rejected() {
    let mut room = room();
    let err = room.attack(Player::P1, Coordinate::new(8, 0)).unwrap_err();
    assert_eq!(
        err,
        GameError::Validation(ValidationError::OutOfBounds(Coordinate::new(8, 0)))
    );
}

#[test]
fn nuke_attacks_exactly_the_in_bounds_unresolved_x() {
    let mut room = room();
    room.grant(Player::P1, AbilityKind::Nuke).unwrap();
    let report = room.fire_nuke(Player::P1, Coordinate::new(0, 0)).unwrap();
    let salvo = report.salvo().expect("not intercepted");
    // Centered in the corner only the center and one diagonal exist.
    assert_eq!(
        coords(&salvo.shots),
        vec![Coordinate::new(0, 0), Coordinate::new(1, 1)]
    );
    assert_eq!(salvo.hits(), 1);
    assert_eq!(room.turn(), Player::P2);
    assert!(!room.rack(Player::P1).ready(AbilityKind::Nuke));
}

#[test]
fn nuke_skips_already_resolved_pattern_members() {
    let mut room = room();
    room.grant(Player::P1, AbilityKind::Nuke).unwrap();
    room.attack(Player::P1, Coordinate::new(1, 1)).unwrap();
    room.attack(Player::P2, Coordinate::new(7, 7)).unwrap();
    let report = room.fire_nuke(Player::P1, Coordinate::new(0, 0)).unwrap();
    let salvo = report.salvo().expect("not intercepted");
    assert_eq!(coords(&salvo.shots), vec![Coordinate::new(0, 0)]);
}

#[test]
fn annihilate_fires_middle_first_and_sides_regardless_of_middle_miss() {
    let mut room = room();
    room.grant(Player::P1, AbilityKind::Annihilate).unwrap();
    let report = room
        .fire_annihilate(Player::P1, Coordinate::new(3, 3), Axis::Horizontal)
        .unwrap();
    let salvo = report.salvo().expect("not intercepted");
    // The middle misses, yet both side cells still fire.
    assert_eq!(salvo.shots[0].coord, Coordinate::new(3, 3));
    assert!(!salvo.shots[0].result.is_hit());
    assert_eq!(
        coords(&salvo.shots),
        vec![
            Coordinate::new(3, 3),
            Coordinate::new(3, 2),
            Coordinate::new(3, 4)
        ]
    );
}

#[test]
fn annihilate_clips_side_cells_at_the_edge() {
    let mut room = room();
    room.grant(Player::P1, AbilityKind::Annihilate).unwrap();
    let report = room
        .fire_annihilate(Player::P1, Coordinate::new(0, 7), Axis::Vertical)
        .unwrap();
    let salvo = report.salvo().expect("not intercepted");
    assert_eq!(
        coords(&salvo.shots),
        vec![Coordinate::new(0, 7), Coordinate::new(1, 7)]
    );
}

#[test]
fn jam_absorbs_one_attack_and_returns_turn_to_installer() {
    let mut room = room();
    room.grant(Player::P2, AbilityKind::Jam).unwrap();
    room.attack(Player::P1, Coordinate::new(5, 5)).unwrap();
    room.install_jam(Player::P2).unwrap();
    assert_eq!(room.turn(), Player::P1);

    let report = room.attack(Player::P1, Coordinate::new(0, 0)).unwrap();
    assert!(report.is_intercepted());
    // No cell was marked, the jam is consumed, and the installer acts next.
    assert!(!room.board(Player::P2).cell(Coordinate::new(0, 0)).unwrap().resolved());
    assert!(!room.rack(Player::P2).installed(AbilityKind::Jam));
    assert_eq!(room.turn(), Player::P2);
    assert_eq!(
        room.moves().last().unwrap().kind,
        MoveKind::Intercepted
    );

    // The jam never triggers twice: the same attack now resolves.
    room.attack(Player::P2, Coordinate::new(6, 6)).unwrap();
    let report = room.attack(Player::P1, Coordinate::new(0, 0)).unwrap();
    assert!(report.salvo().is_some());
}

#[test]
fn jammed_pattern_ability_is_still_consumed() {
    let mut room = room();
    room.grant(Player::P1, AbilityKind::Nuke).unwrap();
    room.grant(Player::P2, AbilityKind::Jam).unwrap();
    room.attack(Player::P1, Coordinate::new(5, 5)).unwrap();
    room.install_jam(Player::P2).unwrap();
    let report = room.fire_nuke(Player::P1, Coordinate::new(0, 0)).unwrap();
    assert!(report.is_intercepted());
    let state = room.rack(Player::P1).state(AbilityKind::Nuke).unwrap();
    assert!(state.used);
    // And the absorbed pattern marked nothing.
    assert!(!room.board(Player::P2).cell(Coordinate::new(0, 0)).unwrap().resolved());
}

#[test]
fn counter_retaliates_once_against_an_intact_ship_cell() {
    let mut room = room();
    room.grant(Player::P2, AbilityKind::Counter).unwrap();
    room.attack(Player::P1, Coordinate::new(5, 5)).unwrap();
    room.install_counter(Player::P2).unwrap();

    let report = room.attack(Player::P1, Coordinate::new(0, 0)).unwrap();
    let salvo = report.salvo().expect("not intercepted");
    let counter = salvo.counter.expect("counter must trigger on the hit");
    let struck = room.board(Player::P1).cell(counter.coord).unwrap();
    assert!(struck.ship().is_some());
    assert_eq!(struck.mark(), Some(ShotMark::Hit));
    assert!(counter.result.is_hit());
    // Retaliation is bookkeeping after the turn flip, not a turn change.
    assert_eq!(room.turn(), Player::P2);
    assert!(!room.rack(Player::P2).installed(AbilityKind::Counter));

    // A later hit draws no second retaliation.
    room.attack(Player::P2, Coordinate::new(5, 5)).unwrap();
    let report = room.attack(Player::P1, Coordinate::new(0, 1)).unwrap();
    assert!(report.salvo().unwrap().counter.is_none());
}

#[test]
fn counter_does_not_trigger_on_misses() {
    let mut room = room();
    room.grant(Player::P2, AbilityKind::Counter).unwrap();
    room.attack(Player::P1, Coordinate::new(5, 5)).unwrap();
    room.install_counter(Player::P2).unwrap();
    let report = room.attack(Player::P1, Coordinate::new(3, 3)).unwrap();
    assert!(report.salvo().unwrap().counter.is_none());
    assert!(room.rack(Player::P2).installed(AbilityKind::Counter));
}

#[test]
fn hacker_reveals_an_intact_ship_cell() {
    let mut room = room();
    room.grant(Player::P1, AbilityKind::Hacker).unwrap();
    let reveal = room.hacker(Player::P1).unwrap();
    let cell = reveal.cell.expect("ships are afloat, a cell must be found");
    let view = room.board(Player::P2).cell(cell).unwrap();
    assert!(view.ship().is_some());
    assert!(!view.resolved());
    assert!(view.revealed());
    assert_eq!(room.turn(), Player::P2);
    assert!(!room.rack(Player::P1).ready(AbilityKind::Hacker));
}

#[test]
fn scanner_counts_ship_cells_in_the_block() {
    let mut room = room();
    room.grant(Player::P1, AbilityKind::Scanner).unwrap();
    // Block (2,0)..(3,1) covers two cruiser cells.
    let scan = room.scanner(Player::P1, Coordinate::new(2, 0)).unwrap();
    assert_eq!(scan.ships, 2);
    assert_eq!(room.turn(), Player::P2);
    // Nothing was attacked.
    assert!(!room.board(Player::P2).cell(Coordinate::new(2, 0)).unwrap().resolved());
}

#[test]
fn quadrant_requires_a_moderated_room() {
    let mut room = room();
    let err = room.grant(Player::P1, AbilityKind::Quadrant).unwrap_err();
    assert_eq!(
        err,
        GameError::Validation(ValidationError::RequiresModerator(AbilityKind::Quadrant))
    );
}

#[test]
fn quadrant_wipe_resolves_every_unresolved_cell_of_the_quadrant() {
    let mut room = moderated_room();
    room.grant(Player::P1, AbilityKind::Quadrant).unwrap();
    let report = room
        .fire_quadrant(Player::P1, Quadrant::NorthWest)
        .unwrap();
    let salvo = report.salvo().expect("not intercepted");
    // Rows 0..4 x cols 0..4 on an 8x8 board.
    assert_eq!(salvo.shots.len(), 16);
    // Battleship row 0 (4 cells) and cruiser cols 0..3 of row 2 (3 cells).
    assert_eq!(salvo.hits(), 7);
    for row in 0..4 {
        for col in 0..4 {
            assert!(room
                .board(Player::P2)
                .cell(Coordinate::new(row, col))
                .unwrap()
                .resolved());
        }
    }
}

#[test]
fn grant_cap_applies_across_common_abilities() {
    let mut room = room();
    room.grant(Player::P1, AbilityKind::Nuke).unwrap();
    room.grant(Player::P1, AbilityKind::Hacker).unwrap();
    room.grant(Player::P1, AbilityKind::Jam).unwrap();
    let err = room.grant(Player::P1, AbilityKind::Scanner).unwrap_err();
    assert_eq!(err, GameError::Validation(ValidationError::CapExceeded));
}

#[test]
fn elimination_records_winner_and_freezes_the_room() {
    let mut room = room();
    let ship_cells: Vec<Coordinate> = room
        .board(Player::P2)
        .iter_ships()
        .flat_map(|ship| ship.coords().collect::<Vec<_>>())
        .collect();
    let mut filler = (0..8)
        .map(|col| Coordinate::new(7, col))
        .chain((0..8).map(|col| Coordinate::new(5, col)));
    for target in ship_cells {
        room.attack(Player::P1, target).unwrap();
        if room.verdict().is_none() {
            room.attack(Player::P2, filler.next().unwrap()).unwrap();
        }
    }
    let verdict = room.verdict().expect("all ships sunk");
    assert_eq!(verdict.winner, Player::P1);
    assert_eq!(verdict.reason, VictoryKind::Elimination);
    // The room is frozen: every further action fails validation.
    let err = room.attack(Player::P2, Coordinate::new(7, 7)).unwrap_err();
    assert_eq!(err, GameError::Validation(ValidationError::GameOver));
}

#[test]
fn surrender_ends_the_game_for_the_opponent() {
    let mut room = room();
    room.surrender(Player::P2).unwrap();
    let verdict = room.verdict().unwrap();
    assert_eq!(verdict.winner, Player::P1);
    assert_eq!(verdict.reason, VictoryKind::Surrender);
    assert!(matches!(
        room.attack(Player::P1, Coordinate::new(0, 0)),
        Err(GameError::Validation(ValidationError::GameOver))
    ));
}

#[test]
fn ability_fire_requires_a_grant() {
    let mut room = room();
    let err = room.fire_nuke(Player::P1, Coordinate::new(3, 3)).unwrap_err();
    assert_eq!(
        err,
        GameError::Validation(ValidationError::AbilityUnavailable(AbilityKind::Nuke))
    );
}

#[test]
fn intercepted_is_distinct_from_success_and_failure() {
    let mut room = room();
    room.grant(Player::P2, AbilityKind::Jam).unwrap();
    room.attack(Player::P1, Coordinate::new(5, 5)).unwrap();
    room.install_jam(Player::P2).unwrap();
    match room.attack(Player::P1, Coordinate::new(0, 0)) {
        Ok(ActionReport::Intercepted) => {}
        other => panic!("expected interception, got {:?}", other),
    }
}
