//! Standalone traffic grid simulation
//!
//! This module contains the whole simulation core: routing, intersections
//! and their lights, vehicles, collisions, traffic control, spawning and the
//! per-tick engine. Presentation layers read `GameState` snapshots and feed
//! light commands back through `GameEngine`.

mod car;
mod city;
mod collision;
mod config;
mod game_state;
mod intersection;
mod road_network;
mod spawner;
mod traffic;
mod types;
mod world;

pub use car::{SimVehicle, VehicleState};
pub use city::SimCity;
pub use collision::{detect_collision, detect_collisions, handle_collision, CollisionResult};
pub use config::SimConfig;
pub use game_state::GameState;
pub use intersection::{blocking_time_for, SimIntersection, TrafficLight, TrafficLightState};
pub use road_network::{RoadEdge, Route, SimRoadNetwork};
pub use spawner::VehicleSpawner;
pub use traffic::{
    apply_intersection_control, form_queue, update_traffic, update_vehicle_following,
};
pub use types::{
    Direction, GridPosition, Position, SimId, Vec2, VehicleId, ARRIVAL_EPSILON,
    BLOCKING_TIME_STEPS, DEFAULT_SPAWN_INTERVAL, DEFAULT_VEHICLE_SPEED,
    INTERSECTION_APPROACH_DISTANCE, MAX_COUNTED_COLLISIONS, MAX_GRID_SIZE, MIN_GRID_SIZE,
    QUEUE_DISTANCE_THRESHOLD, SAFE_DISTANCE,
};
pub use world::{GameEngine, LightCommand};
