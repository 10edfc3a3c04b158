//! Core types for the traffic simulation
//!
//! Grid coordinates, continuous positions, directions and the tuning
//! constants shared by every other module.

use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimId(pub usize);

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub SimId);

impl VehicleId {
    pub fn new(raw: usize) -> Self {
        Self(SimId(raw))
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0 .0)
    }
}

/// One of the four approach sides of an intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Unit step in grid space. North is towards y = 0.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub fn unit_vector(self) -> Vec2 {
        let (dx, dy) = self.offset();
        Vec2::new(dx as f64, dy as f64)
    }

    /// Stable slot index used by per-direction arrays
    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::East => 2,
            Direction::West => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "N",
            Direction::South => "S",
            Direction::East => "E",
            Direction::West => "W",
        };
        f.write_str(name)
    }
}

/// A discrete grid cell, one per intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn neighbor(&self, direction: Direction) -> GridPosition {
        let (dx, dy) = direction.offset();
        GridPosition::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan_distance(&self, other: &GridPosition) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The direction that leads from this cell to an adjacent one
    pub fn direction_to(&self, other: &GridPosition) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|direction| self.neighbor(*direction) == *other)
    }

    /// Center of the cell in world space
    pub fn to_position(self) -> Position {
        Position::new(self.x as f64, self.y as f64)
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A 2D vector in world units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Zero-length vectors normalize to zero
    pub fn normalize(&self) -> Vec2 {
        let len = self.length();
        if len > 0.0 {
            Vec2::new(self.x / len, self.y / len)
        } else {
            Vec2::default()
        }
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// A continuous position in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        (*other - *self).length()
    }

    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Truncate to the grid cell this position lies in.
    /// A position exactly on a boundary belongs to the higher cell.
    pub fn to_grid(&self) -> GridPosition {
        GridPosition::new(self.x.trunc() as i32, self.y.trunc() as i32)
    }
}

impl Add<Vec2> for Position {
    type Output = Position;

    fn add(self, rhs: Vec2) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Vec2;

    fn sub(self, rhs: Position) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Smallest and largest accepted grid edge
pub const MIN_GRID_SIZE: i32 = 10;
pub const MAX_GRID_SIZE: i32 = 20;

/// Default seconds between spawns
pub const DEFAULT_SPAWN_INTERVAL: f64 = 3.0;

/// Default vehicle speed in world units per second
pub const DEFAULT_VEHICLE_SPEED: f64 = 2.0;

/// Blocking time contributed by the 1st, 2nd, 3rd and 4th collision participant
pub const BLOCKING_TIME_STEPS: [f64; 4] = [7.5, 15.0, 30.0, 60.0];

/// Most participants counted towards one blocking episode
pub const MAX_COUNTED_COLLISIONS: usize = BLOCKING_TIME_STEPS.len();

/// Distance to the destination below which a vehicle has arrived
pub const ARRIVAL_EPSILON: f64 = 0.5;

/// Minimum gap to the vehicle ahead
pub const SAFE_DISTANCE: f64 = 1.0;

/// Distance to a blocked intersection at which vehicles queue up
pub const QUEUE_DISTANCE_THRESHOLD: f64 = 1.5;

/// Distance to the next intersection at which lights and slots are checked
pub const INTERSECTION_APPROACH_DISTANCE: f64 = 0.6;
