//! Traffic following and queueing
//!
//! Decides, once per tick and before anything moves, which vehicles may
//! drive and which must wait. Passes run in a fixed order: queueing in front
//! of blocked intersections, then safe following, then signal and slot
//! control at the next intersection.

use log::debug;
use ordered_float::OrderedFloat;
use std::collections::{HashMap, HashSet};

use super::car::{SimVehicle, VehicleState};
use super::city::SimCity;
use super::types::{
    GridPosition, VehicleId, INTERSECTION_APPROACH_DISTANCE, QUEUE_DISTANCE_THRESHOLD,
    SAFE_DISTANCE,
};

/// Run every pass in order
pub fn update_traffic(vehicles: &mut [SimVehicle], city: &mut SimCity, delta_secs: f64) {
    let queued = form_queue(vehicles, city);
    update_vehicle_following(vehicles, &queued);
    apply_intersection_control(vehicles, city, delta_secs);
}

/// Hold vehicles that are close to a blocked intersection ahead of them
/// on their route. Returns the ids that were held.
pub fn form_queue(vehicles: &mut [SimVehicle], city: &SimCity) -> HashSet<VehicleId> {
    let mut queued = HashSet::new();

    let blocked: Vec<GridPosition> = city
        .intersections()
        .iter()
        .filter(|intersection| intersection.is_blocked())
        .map(|intersection| intersection.position)
        .collect();

    if blocked.is_empty() {
        for vehicle in vehicles.iter_mut() {
            if vehicle.state == VehicleState::Waiting {
                vehicle.set_state(VehicleState::Moving);
            }
        }
        return queued;
    }

    for vehicle in vehicles.iter_mut().filter(|v| v.state.is_active()) {
        let destination = vehicle.route.destination().to_position();
        let own_remaining = vehicle.position.distance(&destination);

        let nearest_ahead = blocked
            .iter()
            .filter(|position| vehicle.route.contains(position))
            .filter(|position| position.to_position().distance(&destination) < own_remaining)
            .map(|position| vehicle.distance_to(position))
            .min_by_key(|distance| OrderedFloat(*distance));

        match nearest_ahead {
            Some(distance) if distance <= QUEUE_DISTANCE_THRESHOLD => {
                vehicle.set_state(VehicleState::Waiting);
                queued.insert(vehicle.id);
            }
            _ => vehicle.set_state(VehicleState::Moving),
        }
    }

    queued
}

/// Keep a safe gap to the closest vehicle ahead that shares the same
/// immediate target. Vehicles in `queued` are never released here.
pub fn update_vehicle_following(vehicles: &mut [SimVehicle], queued: &HashSet<VehicleId>) {
    let mut by_target: HashMap<GridPosition, Vec<usize>> = HashMap::new();
    for (index, vehicle) in vehicles.iter().enumerate() {
        if vehicle.state.is_active() {
            by_target.entry(vehicle.target()).or_default().push(index);
        }
    }

    // Decide from one consistent view, then apply
    let mut decisions = Vec::new();
    for (target, group) in &by_target {
        for &index in group {
            let vehicle = &vehicles[index];
            let own_gap = vehicle.distance_to(target);

            let leader_distance = group
                .iter()
                .filter(|&&other| other != index)
                .map(|&other| &vehicles[other])
                .filter(|other| other.distance_to(target) < own_gap)
                .map(|other| vehicle.position.distance(&other.position))
                .min_by_key(|distance| OrderedFloat(*distance));

            match leader_distance {
                Some(distance) if distance < SAFE_DISTANCE => {
                    decisions.push((index, VehicleState::Waiting));
                }
                _ => {
                    if vehicle.state == VehicleState::Waiting && !queued.contains(&vehicle.id) {
                        decisions.push((index, VehicleState::Moving));
                    }
                }
            }
        }
    }

    for (index, state) in decisions {
        vehicles[index].set_state(state);
    }
}

/// Stop Moving vehicles at the next intersection when their light is red
/// or their approach slot is taken; otherwise claim the slot.
///
/// A vehicle is checked once it is within the approach distance or could
/// reach the intersection during this step.
pub fn apply_intersection_control(
    vehicles: &mut [SimVehicle],
    city: &mut SimCity,
    delta_secs: f64,
) {
    for vehicle in vehicles
        .iter_mut()
        .filter(|v| v.state == VehicleState::Moving)
    {
        let Some(next) = vehicle.route.next() else {
            continue;
        };
        let reach = INTERSECTION_APPROACH_DISTANCE.max(vehicle.speed * delta_secs);
        if vehicle.distance_to(&next) > reach {
            continue;
        }
        let Some(approach) = next.direction_to(&vehicle.route.current()) else {
            continue;
        };
        let Some(intersection) = city.intersection_mut(&next) else {
            continue;
        };

        // Already committed to the crossing
        if intersection.occupant(approach) == Some(vehicle.id) && !intersection.is_blocked() {
            continue;
        }

        if intersection.can_vehicle_pass(approach)
            && intersection.can_vehicle_enter(approach, vehicle.id)
        {
            intersection.enter_intersection(approach, vehicle.id);
            debug!("Vehicle {} entering {} from {}", vehicle.id, next, approach);
        } else {
            vehicle.set_state(VehicleState::Waiting);
        }
    }
}
