//! End-to-end controller scenarios over fixture grids.

use nav_core::prelude::*;
use nav_test_utils::fixtures::{
    every_tick_config, open_grid, parse_script, vec2, walled_grid, Harness, ScriptStep,
};

fn recalculations(log: &EventLog) -> Vec<(Vec<Vec2Fixed>, bool)> {
    log.events()
        .filter_map(|event| match event {
            NavEvent::Recalculate { path, reachable } => Some((path.clone(), *reachable)),
            _ => None,
        })
        .collect()
}

#[test]
fn walks_around_wall_and_arrives_once() {
    let mut harness = Harness::at_cell(&walled_grid(), every_tick_config(), GridCell::new(0, 0));
    harness.controller.go(GridCell::new(4, 0));

    assert!(harness.run_until_idle(100));

    let log = harness.log();
    let moves: Vec<GridCell> = log.moves().map(|(intent, _)| intent.cell).collect();
    assert_eq!(moves.len(), 12);
    assert!(moves.contains(&GridCell::new(2, 4)));
    assert_eq!(moves.last(), Some(&GridCell::new(4, 0)));
    assert_eq!(log.stop_count(true), 1);
    assert_eq!(log.end_count(), 1);
    assert_eq!(recalculations(log).len(), 1);
    assert!(harness.controller.destination().is_none());
    assert!(harness.controller.path().is_none());
    assert_eq!(harness.agent_cell(), Some(GridCell::new(4, 0)));
}

#[test]
fn default_cadence_spaces_moves() {
    let config = NavConfig::default();
    let mut harness = Harness::at_cell(&open_grid(5, 5), config, GridCell::new(0, 0));
    harness.controller.go(GridCell::new(4, 4));

    assert!(harness.run_until_idle(8 * 6 + 1));
    assert_eq!(harness.controller.tick_count(), 48);
    assert_eq!(harness.log().moves().count(), 8);
}

#[test]
fn stop_mid_path_then_go_again() {
    let mut harness = Harness::at_cell(&open_grid(6, 6), every_tick_config(), GridCell::new(0, 0));
    harness.controller.go(GridCell::new(5, 0));
    harness.run(2);

    harness.controller.stop();
    harness.run(3);
    assert_eq!(harness.log().stop_count(false), 1);
    assert_eq!(harness.log().moves().count(), 2);
    assert_eq!(harness.controller.nav_state(), NavState::Idle);

    harness.controller.go(GridCell::new(2, 5));
    harness.tick();
    let recalcs = recalculations(harness.log());
    assert_eq!(recalcs.len(), 2);
    assert_eq!(recalcs[1].0.last(), Some(&vec2(2, 5)));
    assert!(harness.run_until_idle(20));
    assert_eq!(harness.agent_cell(), Some(GridCell::new(2, 5)));
}

#[test]
fn pause_keeps_recalculating() {
    let config = NavConfig {
        move_interval: 2,
        recalc_interval: 4,
        ..NavConfig::default()
    };
    let mut harness = Harness::at_cell(&open_grid(5, 5), config, GridCell::new(0, 0));
    harness.controller.go(GridCell::new(4, 4));
    harness.controller.pause();

    harness.run(12);
    assert_eq!(harness.log().moves().count(), 0);
    // Tick 2 (moved), then 4, 8 and 12.
    assert_eq!(recalculations(harness.log()).len(), 4);
    assert_eq!(harness.controller.nav_state(), NavState::Paused);

    harness.controller.start();
    assert!(harness.run_until_idle(40));
    assert_eq!(harness.log().moves().count(), 8);
}

#[test]
fn followed_entity_redirects_next_recalculation() {
    let mut harness = Harness::at_cell(&open_grid(8, 8), every_tick_config(), GridCell::new(0, 0));
    harness.controller.follow(5);
    harness.move_entity(5, vec2(7, 0));
    harness.run(2);
    assert_eq!(
        recalculations(harness.log()).last().and_then(|(p, _)| p.last().copied()),
        Some(vec2(7, 0))
    );

    harness.move_entity(5, vec2(0, 7));
    harness.tick();
    assert_eq!(
        recalculations(harness.log()).last().and_then(|(p, _)| p.last().copied()),
        Some(vec2(0, 7))
    );

    assert!(harness.run_until_idle(40));
    assert_eq!(harness.agent_cell(), Some(GridCell::new(0, 7)));
    assert!(harness.controller.is_following());
}

#[test]
fn followed_entity_leaving_stops_navigation() {
    let mut harness = Harness::at_cell(&open_grid(8, 8), every_tick_config(), GridCell::new(0, 0));
    harness.controller.follow(5);
    harness.move_entity(5, vec2(7, 7));
    harness.move_entity(6, vec2(3, 3));
    harness.run(2);

    harness.despawn(6);
    assert_eq!(harness.controller.nav_state(), NavState::Seeking);

    harness.despawn(5);
    assert_eq!(harness.controller.nav_state(), NavState::Idle);
    assert!(!harness.controller.is_following());
    assert_eq!(harness.log().stop_count(false), 1);
}

#[test]
fn rejected_moves_still_consume_cells() {
    let mut harness = Harness::at_cell(&open_grid(4, 1), every_tick_config(), GridCell::new(0, 0));
    harness.controller.listener_mut().set_reject_moves(true);
    harness.controller.go(GridCell::new(3, 0));

    harness.run(3);
    // Every cell was offered once and popped, so the path ran out and the
    // controller considers the destination reached while the agent never
    // moved.
    let offered: Vec<_> = harness.log().moves().map(|(i, r)| (i.cell, r)).collect();
    assert_eq!(
        offered,
        vec![
            (GridCell::new(1, 0), MoveResponse::Reject),
            (GridCell::new(2, 0), MoveResponse::Reject),
            (GridCell::new(3, 0), MoveResponse::Reject),
        ]
    );
    assert_eq!(harness.agent_cell(), Some(GridCell::new(0, 0)));
    assert_eq!(harness.log().stop_count(true), 1);
}

#[test]
fn unreachable_goal_retries_without_moving() {
    let grid = nav_test_utils::fixtures::ascii_grid(
        "..#..
         ..#..
         ..#..",
    );
    let mut harness = Harness::at_cell(&grid, every_tick_config(), GridCell::new(0, 0));
    harness.controller.go(GridCell::new(4, 2));
    harness.run(4);

    let recalcs = recalculations(harness.log());
    assert_eq!(recalcs.len(), 4);
    assert!(recalcs.iter().all(|(path, reachable)| path.is_empty() && !reachable));
    assert_eq!(harness.log().moves().count(), 0);
    assert_eq!(harness.controller.nav_state(), NavState::Seeking);

    // Opening the wall lets the next retry succeed.
    harness
        .controller
        .grids_mut()
        .get_or_load(&"fixture".into())
        .unwrap()
        .set_cell(GridCell::new(2, 1), CellType::Walkable);
    assert!(harness.run_until_idle(20));
    assert_eq!(harness.agent_cell(), Some(GridCell::new(4, 2)));
}

#[test]
fn malformed_grid_is_reported_and_tick_survives() {
    let mut bytes = open_grid(3, 3).encode();
    bytes.truncate(bytes.len() - 1);
    assert!(matches!(
        NavGrid::load(&bytes),
        Err(NavError::MalformedGridData(_))
    ));

    let mut source = MemorySource::new();
    source.insert("broken", bytes);
    let mut controller = MovementController::new(every_tick_config(), source, EventLog::new());
    let world = WorldSnapshot::new("broken").with_agent(Vec2Fixed::ZERO);
    controller.go(GridCell::new(2, 2));
    controller.tick(&world);
    controller.tick(&world);

    assert!(!controller.grids().is_loaded(&"broken".into()));
    assert_eq!(controller.listener().entries().len(), 1);
}

#[test]
fn directory_source_feeds_controller() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("yard.nav"), walled_grid().encode()).unwrap();

    let mut controller = MovementController::new(
        every_tick_config(),
        DirectorySource::new(dir.path()),
        EventLog::new(),
    );
    let world = WorldSnapshot::new("yard").with_agent(Vec2Fixed::ZERO);
    controller.go(GridCell::new(4, 0));
    controller.tick(&world);
    assert_eq!(controller.path().map(Path::len), Some(11));
}

#[test]
fn ron_script_drives_harness() {
    let script = parse_script(
        "[
            GoCell(4, 4),
            Tick(3),
            Pause,
            Tick(3),
            Start,
            Tick(10),
        ]",
    )
    .unwrap();
    let mut harness = Harness::at_cell(&open_grid(5, 5), every_tick_config(), GridCell::new(0, 0));
    harness.apply_all(&script);

    assert_eq!(harness.controller.tick_count(), 16);
    assert_eq!(harness.log().moves().count(), 8);
    assert_eq!(harness.log().end_count(), 1);
    assert!(script.contains(&ScriptStep::Pause));
}
