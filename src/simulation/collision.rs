//! Collision detection and resolution
//!
//! Two or more Moving vehicles whose positions truncate into the same
//! intersection cell on the same tick have collided.

use std::collections::{BTreeMap, BTreeSet};

use super::car::{SimVehicle, VehicleState};
use super::intersection::SimIntersection;
use super::types::{GridPosition, VehicleId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollisionResult {
    NoCollision,
    /// Ids of the colliding vehicles, in input order
    Collision(Vec<VehicleId>),
}

/// Check a single intersection. Waiting, Arrived and Crashed vehicles never
/// count, even when they share the cell.
pub fn detect_collision(intersection: &SimIntersection, vehicles: &[SimVehicle]) -> CollisionResult {
    let present: Vec<VehicleId> = vehicles
        .iter()
        .filter(|vehicle| vehicle.state == VehicleState::Moving)
        .filter(|vehicle| vehicle.grid_position() == intersection.position)
        .map(|vehicle| vehicle.id)
        .collect();

    if present.len() >= 2 {
        CollisionResult::Collision(present)
    } else {
        CollisionResult::NoCollision
    }
}

/// Run `detect_collision` for every intersection, keeping only hits
pub fn detect_collisions(
    intersections: &[SimIntersection],
    vehicles: &[SimVehicle],
) -> BTreeMap<GridPosition, BTreeSet<VehicleId>> {
    let mut collisions = BTreeMap::new();
    for intersection in intersections {
        if let CollisionResult::Collision(ids) = detect_collision(intersection, vehicles) {
            collisions.insert(intersection.position, ids.into_iter().collect());
        }
    }
    collisions
}

/// Block the intersection and mark every participant as crashed
pub fn handle_collision(
    intersection: &mut SimIntersection,
    colliding: &BTreeSet<VehicleId>,
    vehicles: &mut [SimVehicle],
) {
    let ids: Vec<VehicleId> = colliding.iter().copied().collect();
    intersection.block_with_collision(&ids);

    for vehicle in vehicles.iter_mut().filter(|v| colliding.contains(&v.id)) {
        vehicle.mark_crashed();
    }
}
