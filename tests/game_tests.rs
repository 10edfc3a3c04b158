//! Game state bookkeeping

use traffic_grid::simulation::{
    Direction, GameState, GridPosition, Route, SimCity, SimVehicle, VehicleId, VehicleState,
};

fn vehicle(id: usize, length: i32) -> SimVehicle {
    let path = (0..=length).map(|x| GridPosition::new(x, 0)).collect();
    SimVehicle::new(VehicleId::new(id), Route::new(path).unwrap(), 2.0)
}

fn new_state() -> GameState {
    GameState::new(SimCity::new(10, 10).unwrap())
}

#[test]
fn test_game_state_initialization() {
    let state = new_state();
    assert!(state.vehicles.is_empty());
    assert_eq!(state.total_score, 0);
    assert_eq!(state.game_time, 0.0);
    assert!(!state.is_playing);
    assert_eq!(state.vehicles_spawned, 0);
    assert_eq!(state.vehicles_completed, 0);
    assert_eq!(state.vehicles_crashed, 0);
}

#[test]
fn test_start_pause_and_time() {
    let mut state = new_state();
    state.start();
    assert!(state.is_playing);
    state.update_time(0.5);
    state.update_time(0.25);
    assert_eq!(state.game_time, 0.75);
    state.pause();
    assert!(!state.is_playing);
}

#[test]
fn test_reaching_destination_scores_and_removes() {
    let mut state = new_state();
    state.add_vehicle(vehicle(1, 4));
    state.add_vehicle(vehicle(2, 4));
    assert_eq!(state.vehicles_spawned, 2);

    state.update_vehicle(VehicleId::new(1), |v| {
        v.crossings_passed = 4;
        v.wait_time = 1.5;
    });
    let score = state.vehicle_reached_destination(VehicleId::new(1));

    // 4 crossings + (4 segments - 1 whole second waited)
    assert_eq!(score, Some(7));
    assert_eq!(state.total_score, 7);
    assert_eq!(state.vehicles_completed, 1);
    assert!(state.vehicle(VehicleId::new(1)).is_none());
    assert_eq!(state.vehicles.len(), 1);

    assert_eq!(state.vehicle_reached_destination(VehicleId::new(1)), None);
    assert_eq!(state.vehicles_completed, 1);
}

#[test]
fn test_remove_vehicle_with_and_without_score() {
    let mut state = new_state();
    state.add_vehicle(vehicle(1, 3));
    state.add_vehicle(vehicle(2, 3));

    assert!(state.remove_vehicle(VehicleId::new(1), false).is_some());
    assert_eq!(state.total_score, 0);
    assert!(state.remove_vehicle(VehicleId::new(2), true).is_some());
    assert_eq!(state.total_score, 3);
    assert!(state.remove_vehicle(VehicleId::new(2), true).is_none());
}

#[test]
fn test_removal_releases_intersection_slots() {
    let mut state = new_state();
    state.add_vehicle(vehicle(1, 3));
    let slot = GridPosition::new(1, 0);
    state.update_city(|city| {
        city.intersection_mut(&slot)
            .unwrap()
            .enter_intersection(Direction::West, VehicleId::new(1));
    });

    state.remove_vehicle(VehicleId::new(1), false);
    assert_eq!(state.city.intersection(&slot).unwrap().occupant(Direction::West), None);
}

#[test]
fn test_vehicle_crashed_marks_and_counts() {
    let mut state = new_state();
    state.add_vehicle(vehicle(1, 3));

    assert!(state.vehicle_crashed(VehicleId::new(1)));
    let crashed = state.vehicle(VehicleId::new(1)).unwrap();
    assert_eq!(crashed.state, VehicleState::Crashed);
    assert!(crashed.is_in_collision);
    assert_eq!(state.vehicles_crashed, 1);
    assert_eq!(state.active_vehicle_count(), 0);

    assert!(!state.vehicle_crashed(VehicleId::new(42)));
    assert_eq!(state.vehicles_crashed, 1);
}

#[test]
fn test_update_unknown_vehicle() {
    let mut state = new_state();
    assert!(!state.update_vehicle(VehicleId::new(5), |v| v.pass_crossing()));
}

#[test]
fn test_success_rate_and_summary() {
    let mut state = new_state();
    assert_eq!(state.success_rate(), 0.0);

    for id in 0..4 {
        state.add_vehicle(vehicle(id, 2));
    }
    state.vehicle_reached_destination(VehicleId::new(0));
    assert_eq!(state.success_rate(), 25.0);

    let summary = state.summary();
    assert!(summary.contains("Spawned: 4"));
    assert!(summary.contains("Completed: 1"));
    assert!(summary.contains("Active: 3"));
}
