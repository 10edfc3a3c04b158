//! Main simulation engine that ties everything together
//!
//! The engine owns the single `GameState`, queues operator commands and
//! advances the simulation one fixed-order tick at a time.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::collections::{BTreeSet, VecDeque};

use super::car::VehicleState;
use super::city::SimCity;
use super::collision::{detect_collisions, handle_collision};
use super::config::SimConfig;
use super::game_state::GameState;
use super::intersection::TrafficLightState;
use super::spawner::VehicleSpawner;
use super::traffic::update_traffic;
use super::types::{Direction, GridPosition, VehicleId, ARRIVAL_EPSILON};

/// An operator request against one light
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightCommand {
    ToggleLight {
        intersection: GridPosition,
        direction: Direction,
    },
    SetLight {
        intersection: GridPosition,
        direction: Direction,
        state: TrafficLightState,
    },
}

pub struct GameEngine {
    state: GameState,
    spawner: VehicleSpawner,
    /// Drained once per tick in arrival order
    pending_commands: VecDeque<LightCommand>,
    ticks: u64,
}

impl GameEngine {
    /// Build a city from the config and start playing
    pub fn new(config: &SimConfig) -> Result<Self> {
        config.validate().context("Invalid simulation config")?;
        let city = SimCity::new(config.width, config.height)?;
        let spawner = match config.seed {
            Some(seed) => {
                VehicleSpawner::new_with_seed(config.spawn_interval, config.vehicle_speed, seed)
            }
            None => VehicleSpawner::new(config.spawn_interval, config.vehicle_speed),
        };
        Ok(Self::from_parts(GameState::new(city), spawner))
    }

    /// Wrap an existing state and spawner. The game is started.
    pub fn from_parts(mut state: GameState, spawner: VehicleSpawner) -> Self {
        state.start();
        Self {
            state,
            spawner,
            pending_commands: VecDeque::new(),
            ticks: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Owned copy of the state for a reader outside the engine
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn pending_command_count(&self) -> usize {
        self.pending_commands.len()
    }

    pub fn start(&mut self) {
        self.state.start();
    }

    pub fn pause(&mut self) {
        self.state.pause();
    }

    pub fn queue_command(&mut self, command: LightCommand) {
        self.pending_commands.push_back(command);
    }

    pub fn toggle_light(&mut self, intersection: GridPosition, direction: Direction) {
        self.queue_command(LightCommand::ToggleLight {
            intersection,
            direction,
        });
    }

    fn apply_pending_commands(&mut self) {
        while let Some(command) = self.pending_commands.pop_front() {
            let (position, direction) = match command {
                LightCommand::ToggleLight {
                    intersection,
                    direction,
                }
                | LightCommand::SetLight {
                    intersection,
                    direction,
                    ..
                } => (intersection, direction),
            };

            let Some(intersection) = self.state.city.intersection_mut(&position) else {
                warn!("Dropping light command for unknown intersection {}", position);
                continue;
            };

            match command {
                LightCommand::ToggleLight { .. } => intersection.toggle_traffic_light(direction),
                LightCommand::SetLight { state, .. } => {
                    intersection.set_traffic_light(direction, state)
                }
            }
            debug!(
                "Light {} at {} is now {:?}",
                direction,
                position,
                intersection.light(direction).state
            );
        }
    }

    /// Count down blocking timers and clear out the wrecks of every
    /// intersection that reopens this tick. No points are awarded.
    fn update_intersections(&mut self, delta_secs: f64) {
        let mut reopened = Vec::new();
        for intersection in self.state.city.intersections_mut() {
            if !intersection.is_blocked() {
                continue;
            }
            let collided = intersection.collided_vehicles().clone();
            if intersection.update_block_timer(delta_secs) {
                reopened.push((intersection.position, collided));
            }
        }

        for (position, collided) in reopened {
            let wrecks: BTreeSet<VehicleId> = self
                .state
                .vehicles
                .iter()
                .filter(|vehicle| {
                    collided.contains(&vehicle.id)
                        || (vehicle.state == VehicleState::Crashed
                            && vehicle.grid_position() == position)
                })
                .map(|vehicle| vehicle.id)
                .collect();
            for id in &wrecks {
                self.state.remove_vehicle(*id, false);
            }
            info!("Cleared {} wreck(s) from {}", wrecks.len(), position);
        }
    }

    fn spawn_vehicles(&mut self, delta_secs: f64) {
        self.spawner.update(delta_secs);
        if let Some(vehicle) = self.spawner.spawn_and_reset(&self.state.city) {
            self.state.add_vehicle(vehicle);
        }
    }

    /// Move every vehicle and advance routes whose next waypoint was reached
    fn update_vehicles(&mut self, delta_secs: f64) {
        let GameState { city, vehicles, .. } = &mut self.state;
        for vehicle in vehicles.iter_mut() {
            vehicle.move_step(delta_secs);
            if vehicle.state != VehicleState::Moving || !vehicle.has_reached_next_waypoint() {
                continue;
            }

            let left = vehicle.route.current();
            vehicle.route.advance();
            let reached = vehicle.route.current();
            if let (Some(approach), Some(intersection)) =
                (reached.direction_to(&left), city.intersection_mut(&reached))
            {
                if intersection.occupant(approach) == Some(vehicle.id) {
                    intersection.leave_intersection(approach);
                }
            }
            vehicle.pass_crossing();
            debug!("Vehicle {} crossed {}", vehicle.id, reached);
        }
    }

    fn resolve_collisions(&mut self) {
        let collisions = detect_collisions(self.state.city.intersections(), &self.state.vehicles);
        for (position, ids) in collisions {
            let GameState { city, vehicles, .. } = &mut self.state;
            let Some(intersection) = city.intersection_mut(&position) else {
                continue;
            };
            handle_collision(intersection, &ids, vehicles);
            for id in &ids {
                self.state.vehicle_crashed(*id);
            }
            // Wrecks hold no slots anywhere
            for id in &ids {
                self.state.city.release_vehicle(*id);
            }
        }
    }

    fn finalize_arrivals(&mut self) {
        let arrived: Vec<VehicleId> = self
            .state
            .vehicles
            .iter()
            .filter(|vehicle| vehicle.state.is_active())
            .filter(|vehicle| vehicle.route.is_at_destination())
            .filter(|vehicle| vehicle.distance_to(&vehicle.route.destination()) < ARRIVAL_EPSILON)
            .map(|vehicle| vehicle.id)
            .collect();

        for id in arrived {
            self.state.vehicle_reached_destination(id);
        }
    }

    /// Main simulation tick. The order of the steps is part of the contract.
    pub fn tick(&mut self, delta_secs: f64) {
        if !self.state.is_playing {
            return;
        }
        self.ticks += 1;

        self.state.update_time(delta_secs);
        self.update_intersections(delta_secs);
        self.spawn_vehicles(delta_secs);
        self.apply_pending_commands();
        update_traffic(&mut self.state.vehicles, &mut self.state.city, delta_secs);
        self.update_vehicles(delta_secs);
        self.resolve_collisions();
        self.finalize_arrivals();
    }

    /// Log the end-of-run statistics
    pub fn log_summary(&self) {
        let state = &self.state;
        let blocked = state
            .city
            .intersections()
            .iter()
            .filter(|intersection| intersection.is_blocked())
            .count();
        info!("=== SIMULATION COMPLETE ===");
        info!("Elapsed time: {:.2}s", state.game_time);
        info!("Ticks: {}", self.ticks);
        info!("Total vehicles spawned: {}", state.vehicles_spawned);
        info!("Total vehicles completed: {}", state.vehicles_completed);
        info!("Total vehicles crashed: {}", state.vehicles_crashed);
        info!("Active vehicles: {}", state.vehicles.len());
        info!("Blocked intersections: {}", blocked);
        info!("Total score: {}", state.total_score);
        info!("Success rate: {:.1}%", state.success_rate());
    }
}
