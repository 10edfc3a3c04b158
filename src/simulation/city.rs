//! The grid city: a dense rectangle of intersections plus the road network
//! connecting every intersection to its four neighbours.

use anyhow::{ensure, Result};

use super::intersection::SimIntersection;
use super::road_network::SimRoadNetwork;
use super::types::{Direction, GridPosition, VehicleId, MAX_GRID_SIZE, MIN_GRID_SIZE};

/// Weight of every road in a generated grid
const GRID_ROAD_WEIGHT: u32 = 1;

#[derive(Debug, Clone)]
pub struct SimCity {
    width: i32,
    height: i32,
    /// Stored row-major, index `y * width + x`
    intersections: Vec<SimIntersection>,
    road_network: SimRoadNetwork,
}

impl SimCity {
    /// Build a fully connected grid city
    pub fn new(width: i32, height: i32) -> Result<Self> {
        ensure!(
            (MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&width),
            "Grid width {} outside [{}, {}]",
            width,
            MIN_GRID_SIZE,
            MAX_GRID_SIZE
        );
        ensure!(
            (MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&height),
            "Grid height {} outside [{}, {}]",
            height,
            MIN_GRID_SIZE,
            MAX_GRID_SIZE
        );

        let mut intersections = Vec::with_capacity((width * height) as usize);
        let mut road_network = SimRoadNetwork::new();
        for y in 0..height {
            for x in 0..width {
                let position = GridPosition::new(x, y);
                intersections.push(SimIntersection::new(position));
                road_network.add_intersection(position);
            }
        }

        // Connect grid horizontally and vertically
        for y in 0..height {
            for x in 0..width {
                let here = GridPosition::new(x, y);
                if x + 1 < width {
                    let east = here.neighbor(Direction::East);
                    road_network.add_two_way_road(here, east, GRID_ROAD_WEIGHT)?;
                }
                if y + 1 < height {
                    let south = here.neighbor(Direction::South);
                    road_network.add_two_way_road(here, south, GRID_ROAD_WEIGHT)?;
                }
            }
        }

        Self::from_parts(width, height, intersections, road_network)
    }

    /// Assemble a city from prebuilt parts, checking full coverage
    pub fn from_parts(
        width: i32,
        height: i32,
        intersections: Vec<SimIntersection>,
        road_network: SimRoadNetwork,
    ) -> Result<Self> {
        ensure!(width > 0 && height > 0, "Grid must not be empty");
        ensure!(
            intersections.len() == (width * height) as usize,
            "Expected {} intersections for a {}x{} grid, got {}",
            width * height,
            width,
            height,
            intersections.len()
        );
        for (index, intersection) in intersections.iter().enumerate() {
            let expected = GridPosition::new(index as i32 % width, index as i32 / width);
            ensure!(
                intersection.position == expected,
                "Intersection at slot {} is {}, expected {}",
                index,
                intersection.position,
                expected
            );
        }

        Ok(Self {
            width,
            height,
            intersections,
            road_network,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn road_network(&self) -> &SimRoadNetwork {
        &self.road_network
    }

    fn index_of(&self, position: &GridPosition) -> Option<usize> {
        if self.contains(position) {
            Some((position.y * self.width + position.x) as usize)
        } else {
            None
        }
    }

    pub fn contains(&self, position: &GridPosition) -> bool {
        (0..self.width).contains(&position.x) && (0..self.height).contains(&position.y)
    }

    pub fn intersection(&self, position: &GridPosition) -> Option<&SimIntersection> {
        self.index_of(position).map(|index| &self.intersections[index])
    }

    pub fn intersection_mut(&mut self, position: &GridPosition) -> Option<&mut SimIntersection> {
        let index = self.index_of(position)?;
        Some(&mut self.intersections[index])
    }

    pub fn intersections(&self) -> &[SimIntersection] {
        &self.intersections
    }

    pub fn intersections_mut(&mut self) -> &mut [SimIntersection] {
        &mut self.intersections
    }

    pub fn intersection_count(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_border(&self, position: &GridPosition) -> bool {
        self.contains(position)
            && (position.x == 0
                || position.y == 0
                || position.x == self.width - 1
                || position.y == self.height - 1)
    }

    /// All rim cells in row-major order
    pub fn border_intersections(&self) -> Vec<GridPosition> {
        self.intersections
            .iter()
            .map(|intersection| intersection.position)
            .filter(|position| self.is_border(position))
            .collect()
    }

    /// Drop a vehicle's claim on every entry slot in the city
    pub fn release_vehicle(&mut self, vehicle_id: VehicleId) {
        for intersection in self.intersections.iter_mut() {
            intersection.release_vehicle(vehicle_id);
        }
    }
}
