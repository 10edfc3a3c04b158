//! Intersection logic for the traffic simulation
//!
//! Each intersection has four independent lights, one entry slot per
//! approach direction, and a Normal/Blocked state driven by collisions.

use log::info;
use std::collections::BTreeSet;

use super::types::{
    Direction, GridPosition, VehicleId, BLOCKING_TIME_STEPS, MAX_COUNTED_COLLISIONS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrafficLightState {
    Red,
    Green,
}

impl TrafficLightState {
    pub fn toggle(self) -> Self {
        match self {
            TrafficLightState::Red => TrafficLightState::Green,
            TrafficLightState::Green => TrafficLightState::Red,
        }
    }

    pub fn can_pass(self) -> bool {
        matches!(self, TrafficLightState::Green)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficLight {
    pub direction: Direction,
    pub state: TrafficLightState,
}

impl TrafficLight {
    pub fn new(direction: Direction, state: TrafficLightState) -> Self {
        Self { direction, state }
    }

    pub fn toggle(&mut self) {
        self.state = self.state.toggle();
    }

    pub fn can_pass(&self) -> bool {
        self.state.can_pass()
    }
}

/// Total closure time for `count` counted collision participants
pub fn blocking_time_for(count: usize) -> f64 {
    BLOCKING_TIME_STEPS
        .iter()
        .take(count.min(MAX_COUNTED_COLLISIONS))
        .sum()
}

/// An intersection in the traffic simulation
#[derive(Debug, Clone)]
pub struct SimIntersection {
    pub position: GridPosition,
    /// Indexed by `Direction::index`
    lights: [TrafficLight; 4],
    /// Vehicle holding the entry slot for each approach direction
    occupancy: [Option<VehicleId>; 4],
    blocking_time_remaining: f64,
    /// Participants counted towards the current blocking episode
    collided_vehicles: BTreeSet<VehicleId>,
}

impl SimIntersection {
    pub fn new(position: GridPosition) -> Self {
        Self {
            position,
            lights: Direction::ALL.map(|d| TrafficLight::new(d, TrafficLightState::Green)),
            occupancy: [None; 4],
            blocking_time_remaining: 0.0,
            collided_vehicles: BTreeSet::new(),
        }
    }

    pub fn light(&self, direction: Direction) -> &TrafficLight {
        &self.lights[direction.index()]
    }

    pub fn lights(&self) -> &[TrafficLight; 4] {
        &self.lights
    }

    pub fn is_blocked(&self) -> bool {
        self.blocking_time_remaining > 0.0
    }

    pub fn blocking_time_remaining(&self) -> f64 {
        self.blocking_time_remaining
    }

    pub fn collided_vehicles(&self) -> &BTreeSet<VehicleId> {
        &self.collided_vehicles
    }

    pub fn occupant(&self, direction: Direction) -> Option<VehicleId> {
        self.occupancy[direction.index()]
    }

    /// A blocked intersection lets nothing through regardless of its lights
    pub fn can_vehicle_pass(&self, direction: Direction) -> bool {
        !self.is_blocked() && self.light(direction).can_pass()
    }

    pub fn toggle_traffic_light(&mut self, direction: Direction) {
        self.lights[direction.index()].toggle();
    }

    pub fn set_traffic_light(&mut self, direction: Direction, state: TrafficLightState) {
        self.lights[direction.index()].state = state;
    }

    /// Occupancy gates entering, independent of the light colour.
    /// Reentrant for the vehicle already holding the slot.
    pub fn can_vehicle_enter(&self, direction: Direction, vehicle_id: VehicleId) -> bool {
        if self.is_blocked() {
            return false;
        }
        match self.occupant(direction) {
            None => true,
            Some(holder) => holder == vehicle_id,
        }
    }

    pub fn enter_intersection(&mut self, direction: Direction, vehicle_id: VehicleId) {
        debug_assert!(
            self.can_vehicle_enter(direction, vehicle_id),
            "slot {} at {} already held by {:?}",
            direction,
            self.position,
            self.occupant(direction)
        );
        self.occupancy[direction.index()] = Some(vehicle_id);
    }

    pub fn leave_intersection(&mut self, direction: Direction) {
        self.occupancy[direction.index()] = None;
    }

    /// Clear every slot held by the given vehicle
    pub fn release_vehicle(&mut self, vehicle_id: VehicleId) {
        for slot in self.occupancy.iter_mut() {
            if *slot == Some(vehicle_id) {
                *slot = None;
            }
        }
    }

    /// Close the intersection after a collision.
    ///
    /// Only the first four participants of an episode are counted. A
    /// collision on an intersection that is already blocked adds the
    /// increments of the newly counted participants to the remaining time.
    pub fn block_with_collision(&mut self, colliding_vehicles: &[VehicleId]) {
        let counted_before = self.collided_vehicles.len();
        for id in colliding_vehicles {
            if self.collided_vehicles.len() >= MAX_COUNTED_COLLISIONS {
                break;
            }
            self.collided_vehicles.insert(*id);
        }
        let counted_after = self.collided_vehicles.len();

        let added = blocking_time_for(counted_after) - blocking_time_for(counted_before);
        let was_blocked = self.is_blocked();
        self.blocking_time_remaining += added;

        for light in self.lights.iter_mut() {
            light.state = TrafficLightState::Red;
        }
        self.occupancy = [None; 4];

        info!(
            "Intersection {} {} by collision of {} vehicle(s), {:.1}s remaining",
            self.position,
            if was_blocked { "extended" } else { "blocked" },
            colliding_vehicles.len(),
            self.blocking_time_remaining
        );
    }

    /// Count down the blocking timer. Returns true only on the tick the
    /// intersection goes from Blocked back to Normal.
    pub fn update_block_timer(&mut self, delta_secs: f64) -> bool {
        if !self.is_blocked() {
            return false;
        }

        self.blocking_time_remaining = (self.blocking_time_remaining - delta_secs).max(0.0);
        if self.is_blocked() {
            return false;
        }

        self.collided_vehicles.clear();
        info!("Intersection {} unblocked", self.position);
        true
    }
}
