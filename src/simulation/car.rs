//! Vehicle movement logic for the traffic simulation
//!
//! Vehicles never change state on their own; the traffic manager, the
//! collision handling and the engine drive every transition.

use super::road_network::Route;
use super::types::{GridPosition, Position, VehicleId};

/// Lifecycle of a vehicle. `Arrived` and `Crashed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleState {
    Moving,
    Waiting,
    Arrived,
    Crashed,
}

impl VehicleState {
    pub fn is_terminal(self) -> bool {
        matches!(self, VehicleState::Arrived | VehicleState::Crashed)
    }

    /// Moving or Waiting
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

/// A vehicle in the traffic simulation
#[derive(Debug, Clone)]
pub struct SimVehicle {
    pub id: VehicleId,
    pub position: Position,
    pub route: Route,
    pub speed: f64,
    pub state: VehicleState,
    pub crossings_passed: u32,
    pub wait_time: f64,
    pub is_in_collision: bool,
}

impl SimVehicle {
    /// A fresh vehicle parked on the first intersection of its route
    pub fn new(id: VehicleId, route: Route, speed: f64) -> Self {
        debug_assert!(speed > 0.0, "vehicle speed must be positive");
        Self {
            id,
            position: route.start().to_position(),
            route,
            speed,
            state: VehicleState::Moving,
            crossings_passed: 0,
            wait_time: 0.0,
            is_in_collision: false,
        }
    }

    /// The intersection the vehicle is driving towards
    pub fn target(&self) -> GridPosition {
        self.route.next().unwrap_or_else(|| self.route.current())
    }

    /// The grid cell the vehicle currently occupies
    pub fn grid_position(&self) -> GridPosition {
        self.position.to_grid()
    }

    pub fn distance_to(&self, position: &GridPosition) -> f64 {
        self.position.distance(&position.to_position())
    }

    /// Advance one time step.
    ///
    /// Moving vehicles drive straight at their target and stop on it rather
    /// than overshoot. Waiting vehicles stay put and accumulate wait time.
    /// No safety check happens here.
    pub fn move_step(&mut self, delta_secs: f64) {
        match self.state {
            VehicleState::Moving => {
                let target = self.target().to_position();
                let remaining = self.position.distance(&target);
                let step = self.speed * delta_secs;
                if remaining <= step {
                    self.position = target;
                } else {
                    let heading = (target - self.position).normalize();
                    self.position = self.position + heading * step;
                }
            }
            VehicleState::Waiting => {
                self.wait_time += delta_secs;
            }
            VehicleState::Arrived | VehicleState::Crashed => {}
        }
    }

    /// True when the vehicle sits on the next waypoint of its route
    pub fn has_reached_next_waypoint(&self) -> bool {
        match self.route.next() {
            Some(next) => self.position == next.to_position(),
            None => false,
        }
    }

    pub fn pass_crossing(&mut self) {
        self.crossings_passed += 1;
    }

    pub fn set_state(&mut self, state: VehicleState) {
        if self.state.is_terminal() {
            return;
        }
        self.state = state;
    }

    pub fn mark_crashed(&mut self) {
        self.state = VehicleState::Crashed;
        self.is_in_collision = true;
    }

    /// Crossings plus a route-length bonus that waiting eats into
    pub fn calculate_score(&self) -> u32 {
        let bonus = self.route.total_distance() as i64 - self.wait_time.floor() as i64;
        self.crossings_passed + bonus.max(0) as u32
    }
}
