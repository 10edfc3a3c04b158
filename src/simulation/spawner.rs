//! Timed vehicle spawning between random border intersections

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

use super::car::SimVehicle;
use super::city::SimCity;
use super::types::{GridPosition, VehicleId};

#[derive(Debug, Clone)]
pub struct VehicleSpawner {
    spawn_interval: f64,
    vehicle_speed: f64,
    /// Seconds since the last successful spawn
    elapsed: f64,
    next_id: usize,
    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,
}

impl VehicleSpawner {
    fn new_internal(spawn_interval: f64, vehicle_speed: f64, rng: Option<StdRng>) -> Self {
        Self {
            spawn_interval,
            vehicle_speed,
            elapsed: 0.0,
            next_id: 0,
            rng,
        }
    }

    pub fn new(spawn_interval: f64, vehicle_speed: f64) -> Self {
        Self::new_internal(spawn_interval, vehicle_speed, None)
    }

    /// Create a spawner with a seeded RNG for reproducible spawn sequences
    pub fn new_with_seed(spawn_interval: f64, vehicle_speed: f64, seed: u64) -> Self {
        Self::new_internal(
            spawn_interval,
            vehicle_speed,
            Some(StdRng::seed_from_u64(seed)),
        )
    }

    pub fn spawn_interval(&self) -> f64 {
        self.spawn_interval
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Id the next spawned vehicle will carry
    pub fn next_id(&self) -> VehicleId {
        VehicleId::new(self.next_id)
    }

    /// Choose a random element from a slice, using seeded RNG if available
    fn choose_random<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        match &mut self.rng {
            Some(rng) => slice.choose(rng),
            None => slice.choose(&mut rand::rng()),
        }
    }

    pub fn update(&mut self, delta_secs: f64) {
        self.elapsed += delta_secs;
    }

    /// Build a vehicle if one is due. Does not touch the timer or id counter.
    pub fn try_spawn(&mut self, city: &SimCity) -> Option<SimVehicle> {
        if self.elapsed > 0.0 && self.elapsed < self.spawn_interval {
            return None;
        }

        let borders = city.border_intersections();
        if borders.len() < 2 {
            warn!("Cannot spawn: only {} border intersection(s)", borders.len());
            return None;
        }

        let start = *self.choose_random(&borders)?;
        let candidates: Vec<GridPosition> =
            borders.into_iter().filter(|position| *position != start).collect();
        let destination = *self.choose_random(&candidates)?;

        let Some(route) = city.road_network().find_path(start, destination) else {
            warn!("No route from {} to {}, skipping spawn", start, destination);
            return None;
        };

        Some(SimVehicle::new(self.next_id(), route, self.vehicle_speed))
    }

    /// Spawn and, only on success, restart the timer and advance the id counter
    pub fn spawn_and_reset(&mut self, city: &SimCity) -> Option<SimVehicle> {
        let vehicle = self.try_spawn(city)?;
        self.elapsed = 0.0;
        self.next_id += 1;
        debug!(
            "Spawned vehicle {} {} -> {} ({} segments)",
            vehicle.id,
            vehicle.route.start(),
            vehicle.route.destination(),
            vehicle.route.total_distance()
        );
        Some(vehicle)
    }
}
