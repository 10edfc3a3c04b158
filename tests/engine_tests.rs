//! Per-tick orchestration, command queue and full runs

use std::collections::HashSet;
use traffic_grid::simulation::{
    Direction, GameEngine, GameState, GridPosition, LightCommand, Position, Route, SimCity,
    SimConfig, SimVehicle, TrafficLightState, VehicleId, VehicleSpawner, VehicleState,
    MAX_COUNTED_COLLISIONS,
};

/// Engine over a 10x10 city that will not spawn anything on its own
fn quiet_engine(vehicles: Vec<SimVehicle>) -> GameEngine {
    let mut state = GameState::new(SimCity::new(10, 10).unwrap());
    for vehicle in vehicles {
        state.add_vehicle(vehicle);
    }
    GameEngine::from_parts(state, VehicleSpawner::new_with_seed(1.0e6, 2.0, 0))
}

fn route(cells: &[(i32, i32)]) -> Route {
    Route::new(cells.iter().map(|&(x, y)| GridPosition::new(x, y)).collect()).unwrap()
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = SimConfig {
        width: 9,
        ..SimConfig::default()
    };
    assert!(GameEngine::new(&config).is_err());

    let config = SimConfig {
        spawn_interval: 0.0,
        ..SimConfig::default()
    };
    assert!(GameEngine::new(&config).is_err());

    assert!(GameEngine::new(&SimConfig::default()).is_ok());
}

#[test]
fn test_paused_engine_does_not_advance() {
    let mut engine = quiet_engine(Vec::new());
    engine.pause();
    engine.toggle_light(GridPosition::new(1, 1), Direction::North);
    engine.tick(0.5);

    assert_eq!(engine.state().game_time, 0.0);
    assert_eq!(engine.ticks(), 0);
    assert_eq!(engine.pending_command_count(), 1);

    engine.start();
    engine.tick(0.5);
    assert_eq!(engine.state().game_time, 0.5);
    assert_eq!(engine.pending_command_count(), 0);
}

#[test]
fn test_light_commands_apply_in_arrival_order() {
    let mut engine = quiet_engine(Vec::new());
    let here = GridPosition::new(2, 3);

    engine.toggle_light(here, Direction::East);
    engine.queue_command(LightCommand::SetLight {
        intersection: here,
        direction: Direction::East,
        state: TrafficLightState::Green,
    });
    engine.toggle_light(here, Direction::East);
    engine.toggle_light(here, Direction::South);
    engine.toggle_light(GridPosition::new(50, 50), Direction::South);

    // Nothing changes until the next tick
    let light = |engine: &GameEngine, direction| {
        let intersection = engine.state().city.intersection(&here).unwrap();
        intersection.light(direction).state
    };
    assert_eq!(light(&engine, Direction::East), TrafficLightState::Green);

    engine.tick(0.1);
    assert_eq!(light(&engine, Direction::East), TrafficLightState::Red);
    assert_eq!(light(&engine, Direction::South), TrafficLightState::Red);
    assert_eq!(light(&engine, Direction::North), TrafficLightState::Green);
    assert_eq!(engine.pending_command_count(), 0);
}

#[test]
fn test_vehicle_completes_trip_and_scores() {
    let vehicle = SimVehicle::new(VehicleId::new(0), route(&[(0, 0), (1, 0)]), 2.0);
    let mut engine = quiet_engine(vec![vehicle]);

    for _ in 0..10 {
        engine.tick(0.1);
    }

    let state = engine.state();
    assert!(state.vehicles.is_empty());
    assert_eq!(state.vehicles_completed, 1);
    // One crossing plus a one-segment bonus
    assert_eq!(state.total_score, 2);
    let slot = state.city.intersection(&GridPosition::new(1, 0)).unwrap();
    assert_eq!(slot.occupant(Direction::West), None);
}

#[test]
fn test_red_light_makes_vehicle_wait() {
    let vehicle = SimVehicle::new(VehicleId::new(0), route(&[(0, 0), (1, 0)]), 2.0);
    let mut engine = quiet_engine(vec![vehicle]);
    engine.toggle_light(GridPosition::new(1, 0), Direction::West);

    for _ in 0..20 {
        engine.tick(0.1);
    }
    {
        let held = engine.state().vehicle(VehicleId::new(0)).unwrap();
        assert_eq!(held.state, VehicleState::Waiting);
        assert!(held.wait_time > 1.0 && held.wait_time < 2.0);
        assert!(held.position.x < 1.0);
    }

    engine.toggle_light(GridPosition::new(1, 0), Direction::West);
    for _ in 0..10 {
        engine.tick(0.1);
    }
    let state = engine.state();
    assert_eq!(state.vehicles_completed, 1);
    // The whole-second wait cancels the one-segment bonus
    assert_eq!(state.total_score, 1);
}

#[test]
fn test_collision_blocks_then_clears_wrecks() {
    let mut eastbound = SimVehicle::new(VehicleId::new(1), route(&[(5, 5), (6, 5)]), 2.0);
    eastbound.position = Position::new(5.2, 5.0);
    let mut southbound = SimVehicle::new(VehicleId::new(2), route(&[(5, 5), (5, 6)]), 2.0);
    southbound.position = Position::new(5.0, 5.2);
    let mut engine = quiet_engine(vec![eastbound, southbound]);
    let crash_site = GridPosition::new(5, 5);

    engine.tick(0.1);
    {
        let state = engine.state();
        let intersection = state.city.intersection(&crash_site).unwrap();
        assert!(intersection.is_blocked());
        assert_eq!(intersection.blocking_time_remaining(), 22.5);
        assert_eq!(state.vehicles_crashed, 2);
        for vehicle in &state.vehicles {
            assert_eq!(vehicle.state, VehicleState::Crashed);
            assert!(vehicle.is_in_collision);
        }
    }

    for _ in 0..44 {
        engine.tick(0.5);
    }
    assert!(engine.state().city.intersection(&crash_site).unwrap().is_blocked());
    assert_eq!(engine.state().vehicles.len(), 2);

    engine.tick(0.5);
    let state = engine.state();
    let intersection = state.city.intersection(&crash_site).unwrap();
    assert!(!intersection.is_blocked());
    assert!(intersection.collided_vehicles().is_empty());
    assert!(state.vehicles.is_empty());
    assert_eq!(state.total_score, 0);
    assert_eq!(state.vehicles_completed, 0);
}

#[test]
fn test_snapshot_is_detached() {
    let config = SimConfig {
        width: 10,
        height: 10,
        spawn_interval: 0.5,
        seed: Some(11),
        ..SimConfig::default()
    };
    let mut engine = GameEngine::new(&config).unwrap();
    for _ in 0..30 {
        engine.tick(0.1);
    }
    let snapshot = engine.snapshot();
    for _ in 0..30 {
        engine.tick(0.1);
    }

    assert!(snapshot.game_time < engine.state().game_time);
    assert!(snapshot.vehicles_spawned <= engine.state().vehicles_spawned);
}

#[test]
fn test_long_seeded_run_keeps_invariants() {
    let config = SimConfig {
        width: 12,
        height: 10,
        spawn_interval: 0.5,
        seed: Some(2024),
        ..SimConfig::default()
    };
    let mut engine = GameEngine::new(&config).unwrap();

    for tick in 0..3000 {
        if tick % 150 == 0 {
            engine.toggle_light(GridPosition::new(0, 0), Direction::East);
            engine.toggle_light(GridPosition::new(5, 5), Direction::North);
        }
        engine.tick(1.0 / 30.0);

        let state = engine.state();
        let ids: HashSet<VehicleId> = state.vehicles.iter().map(|v| v.id).collect();
        assert_eq!(ids.len(), state.vehicles.len(), "vehicle ids must be unique");

        for intersection in state.city.intersections() {
            assert!(intersection.collided_vehicles().len() <= MAX_COUNTED_COLLISIONS);
            assert_eq!(intersection.is_blocked(), intersection.blocking_time_remaining() > 0.0);
            if intersection.is_blocked() {
                for direction in Direction::ALL {
                    assert_eq!(intersection.occupant(direction), None);
                }
            }
            for direction in Direction::ALL {
                if let Some(holder) = intersection.occupant(direction) {
                    assert!(ids.contains(&holder), "slot held by a removed vehicle");
                }
            }
        }

        for vehicle in &state.vehicles {
            assert!(vehicle.state != VehicleState::Arrived);
            assert!(vehicle.wait_time >= 0.0);
            assert!(vehicle.route.current_index() < vehicle.route.path().len());
        }

        assert!(state.vehicles_spawned >= state.vehicles_completed + state.vehicles.len());
    }

    let state = engine.state();
    assert!(state.vehicles_spawned > 0);
    assert!(state.vehicles_completed + state.vehicles_crashed > 0);
}

#[test]
fn test_clock_keeps_pace_after_a_week() {
    let mut state = GameState::new(SimCity::new(10, 10).unwrap());
    state.game_time = 600_000.0;
    let mut engine = GameEngine::from_parts(state, VehicleSpawner::new_with_seed(1.0e6, 2.0, 0));

    for _ in 0..30 {
        engine.tick(1.0 / 30.0);
    }

    let elapsed = engine.state().game_time - 600_000.0;
    assert!((elapsed - 1.0).abs() < 1e-6, "one second took {}", elapsed);
}

#[test]
fn test_coarse_tick_still_stops_at_red_light() {
    let vehicle = SimVehicle::new(VehicleId::new(0), route(&[(0, 0), (1, 0), (2, 0)]), 2.0);
    let mut engine = quiet_engine(vec![vehicle]);
    let light = GridPosition::new(1, 0);
    engine.toggle_light(light, Direction::West);

    // speed * dt covers the whole segment in one tick
    engine.tick(0.5);
    {
        let held = engine.state().vehicle(VehicleId::new(0)).unwrap();
        assert_eq!(held.state, VehicleState::Waiting);
        assert_eq!(held.position, Position::new(0.0, 0.0));
        assert_eq!(held.crossings_passed, 0);
    }

    engine.toggle_light(light, Direction::West);
    engine.tick(0.5);
    let crossed = engine.state().vehicle(VehicleId::new(0)).unwrap();
    assert_eq!(crossed.state, VehicleState::Moving);
    assert_eq!(crossed.position, Position::new(1.0, 0.0));
    assert_eq!(crossed.crossings_passed, 1);
    assert_eq!(crossed.route.current(), light);
}

#[test]
fn test_pileup_beyond_counted_limit_clears_every_wreck() {
    let crash_site = GridPosition::new(5, 5);
    let starts = [
        ((6, 5), (5.2, 5.0)),
        ((5, 6), (5.0, 5.2)),
        ((4, 5), (5.5, 5.0)),
        ((5, 4), (5.0, 5.5)),
        ((7, 7), (5.5, 5.5)),
    ];
    let vehicles = starts
        .iter()
        .enumerate()
        .map(|(id, &(target, (x, y)))| {
            let mut vehicle = SimVehicle::new(VehicleId::new(id), route(&[(5, 5), target]), 2.0);
            vehicle.position = Position::new(x, y);
            vehicle
        })
        .collect();
    let mut engine = quiet_engine(vehicles);

    engine.tick(0.1);
    {
        let state = engine.state();
        let intersection = state.city.intersection(&crash_site).unwrap();
        assert_eq!(intersection.collided_vehicles().len(), MAX_COUNTED_COLLISIONS);
        assert_eq!(intersection.blocking_time_remaining(), 112.5);
        assert_eq!(state.vehicles_crashed, 5);
        assert!(state
            .vehicles
            .iter()
            .all(|vehicle| vehicle.state == VehicleState::Crashed));
    }

    for _ in 0..224 {
        engine.tick(0.5);
    }
    assert!(engine.state().city.intersection(&crash_site).unwrap().is_blocked());
    assert_eq!(engine.state().vehicles.len(), 5);

    engine.tick(0.5);
    let state = engine.state();
    assert!(!state.city.intersection(&crash_site).unwrap().is_blocked());
    assert!(state.vehicles.is_empty());
    assert_eq!(state.total_score, 0);
}
