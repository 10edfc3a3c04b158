//! Construction-time settings for a simulation run

use anyhow::{ensure, Result};

use super::types::{DEFAULT_SPAWN_INTERVAL, DEFAULT_VEHICLE_SPEED, MAX_GRID_SIZE, MIN_GRID_SIZE};

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub width: i32,
    pub height: i32,
    /// Seconds between spawns
    pub spawn_interval: f64,
    /// World units per second
    pub vehicle_speed: f64,
    /// Seed for reproducible spawn sequences
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 15,
            height: 15,
            spawn_interval: DEFAULT_SPAWN_INTERVAL,
            vehicle_speed: DEFAULT_VEHICLE_SPEED,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&self.width)
                && (MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&self.height),
            "Grid size {}x{} outside [{}, {}]",
            self.width,
            self.height,
            MIN_GRID_SIZE,
            MAX_GRID_SIZE
        );
        ensure!(
            self.spawn_interval > 0.0,
            "Spawn interval must be positive, got {}",
            self.spawn_interval
        );
        ensure!(
            self.vehicle_speed > 0.0,
            "Vehicle speed must be positive, got {}",
            self.vehicle_speed
        );
        Ok(())
    }
}
