//! Game state tracking for the traffic grid
//!
//! The aggregate root of a run: the city, every live vehicle, the score and
//! the spawn/complete/crash counters.

use log::debug;

use super::car::{SimVehicle, VehicleState};
use super::city::SimCity;
use super::types::VehicleId;

#[derive(Debug, Clone)]
pub struct GameState {
    pub city: SimCity,

    /// Live vehicles in spawn order. Ids are unique.
    pub vehicles: Vec<SimVehicle>,

    /// Points from completed trips
    pub total_score: u32,

    /// Game time in seconds
    pub game_time: f64,

    pub is_playing: bool,

    pub vehicles_spawned: usize,
    pub vehicles_completed: usize,
    pub vehicles_crashed: usize,
}

impl GameState {
    /// A paused game over the given city with no vehicles
    pub fn new(city: SimCity) -> Self {
        Self {
            city,
            vehicles: Vec::new(),
            total_score: 0,
            game_time: 0.0,
            is_playing: false,
            vehicles_spawned: 0,
            vehicles_completed: 0,
            vehicles_crashed: 0,
        }
    }

    pub fn start(&mut self) {
        self.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    pub fn update_time(&mut self, delta_secs: f64) {
        self.game_time += delta_secs;
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&SimVehicle> {
        self.vehicles.iter().find(|vehicle| vehicle.id == id)
    }

    pub fn add_vehicle(&mut self, vehicle: SimVehicle) {
        debug_assert!(
            self.vehicle(vehicle.id).is_none(),
            "duplicate vehicle id {}",
            vehicle.id
        );
        self.vehicles.push(vehicle);
        self.vehicles_spawned += 1;
    }

    /// Remove a vehicle, optionally crediting its score. Releases any
    /// intersection slot it still holds.
    pub fn remove_vehicle(&mut self, id: VehicleId, add_score: bool) -> Option<SimVehicle> {
        let index = self.vehicles.iter().position(|vehicle| vehicle.id == id)?;
        let vehicle = self.vehicles.remove(index);
        if add_score {
            self.total_score += vehicle.calculate_score();
        }
        self.city.release_vehicle(id);
        Some(vehicle)
    }

    /// Finish a trip: score it, drop the vehicle and count the completion.
    /// Returns the points awarded.
    pub fn vehicle_reached_destination(&mut self, id: VehicleId) -> Option<u32> {
        let mut vehicle = self.remove_vehicle(id, false)?;
        vehicle.set_state(VehicleState::Arrived);
        let score = vehicle.calculate_score();
        self.total_score += score;
        self.vehicles_completed += 1;
        debug!(
            "Vehicle {} arrived at {} scoring {} ({} crossings, {:.1}s waiting)",
            id,
            vehicle.route.destination(),
            score,
            vehicle.crossings_passed,
            vehicle.wait_time
        );
        Some(score)
    }

    /// Record a crash, marking the vehicle if that has not happened yet
    pub fn vehicle_crashed(&mut self, id: VehicleId) -> bool {
        if !self.update_vehicle(id, SimVehicle::mark_crashed) {
            return false;
        }
        self.vehicles_crashed += 1;
        true
    }

    /// Apply `f` to one vehicle. Returns false when the id is unknown.
    pub fn update_vehicle<F>(&mut self, id: VehicleId, f: F) -> bool
    where
        F: FnOnce(&mut SimVehicle),
    {
        match self.vehicles.iter_mut().find(|vehicle| vehicle.id == id) {
            Some(vehicle) => {
                f(vehicle);
                true
            }
            None => false,
        }
    }

    pub fn update_city<F>(&mut self, f: F)
    where
        F: FnOnce(&mut SimCity),
    {
        f(&mut self.city);
    }

    pub fn active_vehicle_count(&self) -> usize {
        self.vehicles
            .iter()
            .filter(|vehicle| vehicle.state.is_active())
            .count()
    }

    /// Completed trips as a percentage of spawned vehicles
    pub fn success_rate(&self) -> f64 {
        if self.vehicles_spawned > 0 {
            self.vehicles_completed as f64 / self.vehicles_spawned as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Get a summary string for display
    pub fn summary(&self) -> String {
        format!(
            "Score: {} | Spawned: {} | Completed: {} | Crashed: {} | Active: {} | Time: {:.1}s",
            self.total_score,
            self.vehicles_spawned,
            self.vehicles_completed,
            self.vehicles_crashed,
            self.vehicles.len(),
            self.game_time
        )
    }
}
