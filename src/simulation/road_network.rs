//! Road network graph for pathfinding
//!
//! Intersections are nodes keyed by their grid cell, roads are directed
//! weighted edges. Routes are found with Dijkstra (A* with a null heuristic).

use anyhow::{bail, Context, Result};
use petgraph::algo::astar;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

use super::types::GridPosition;

/// Edge data for the road network graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoadEdge {
    pub weight: u32,
}

/// An ordered, non-empty list of intersections plus a traversal cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    path: Vec<GridPosition>,
    current_index: usize,
}

impl Route {
    /// Returns `None` for an empty path
    pub fn new(path: Vec<GridPosition>) -> Option<Self> {
        if path.is_empty() {
            return None;
        }
        Some(Self {
            path,
            current_index: 0,
        })
    }

    pub fn path(&self) -> &[GridPosition] {
        &self.path
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn start(&self) -> GridPosition {
        self.path[0]
    }

    pub fn destination(&self) -> GridPosition {
        self.path[self.path.len() - 1]
    }

    pub fn current(&self) -> GridPosition {
        self.path[self.current_index]
    }

    pub fn next(&self) -> Option<GridPosition> {
        self.path.get(self.current_index + 1).copied()
    }

    /// Number of road segments between start and destination
    pub fn total_distance(&self) -> usize {
        self.path.len() - 1
    }

    pub fn is_at_destination(&self) -> bool {
        self.current_index == self.path.len() - 1
    }

    pub fn contains(&self, position: &GridPosition) -> bool {
        self.path.contains(position)
    }

    /// Move the cursor one step forward. Returns the intersection that was
    /// left behind, or `None` when already at the destination.
    pub fn advance(&mut self) -> Option<GridPosition> {
        if self.is_at_destination() {
            return None;
        }
        let left = self.current();
        self.current_index += 1;
        Some(left)
    }
}

/// Road network graph used by the spawner to route vehicles
#[derive(Debug, Clone, Default)]
pub struct SimRoadNetwork {
    /// The underlying petgraph directed graph
    graph: DiGraph<GridPosition, RoadEdge>,

    /// Maps grid cells to their node indices in the graph
    position_to_node: HashMap<GridPosition, NodeIndex>,
}

impl SimRoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an intersection to the network graph
    pub fn add_intersection(&mut self, position: GridPosition) {
        if self.position_to_node.contains_key(&position) {
            return;
        }
        let node_index = self.graph.add_node(position);
        self.position_to_node.insert(position, node_index);
    }

    /// Adds a one-way road between two known intersections
    pub fn add_road(&mut self, from: GridPosition, to: GridPosition, weight: u32) -> Result<()> {
        if from == to {
            bail!("Refusing to add a self-loop at {}", from);
        }
        if weight == 0 {
            bail!("Road {} -> {} must have a positive weight", from, to);
        }

        let start_node = *self
            .position_to_node
            .get(&from)
            .with_context(|| format!("Intersection {} not found", from))?;
        let end_node = *self
            .position_to_node
            .get(&to)
            .with_context(|| format!("Intersection {} not found", to))?;

        self.graph.add_edge(start_node, end_node, RoadEdge { weight });
        Ok(())
    }

    /// Adds a road in both directions
    pub fn add_two_way_road(&mut self, a: GridPosition, b: GridPosition, weight: u32) -> Result<()> {
        self.add_road(a, b, weight)?;
        self.add_road(b, a, weight)
    }

    pub fn contains(&self, position: &GridPosition) -> bool {
        self.position_to_node.contains_key(position)
    }

    /// Outgoing roads from an intersection as (target, weight) pairs
    pub fn neighbors(&self, position: &GridPosition) -> Vec<(GridPosition, u32)> {
        let Some(node) = self.position_to_node.get(position) else {
            return Vec::new();
        };
        self.graph
            .edges(*node)
            .map(|edge| (self.graph[edge.target()], edge.weight().weight))
            .collect()
    }

    /// Get number of intersections
    pub fn intersection_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get number of one-way roads
    pub fn road_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Finds the shortest route between two intersections.
    ///
    /// `start == destination` yields a single-node route. Unknown or
    /// unreachable intersections yield `None`.
    pub fn find_path(&self, start: GridPosition, destination: GridPosition) -> Option<Route> {
        if start == destination {
            return Route::new(vec![start]);
        }

        let start_node = self.position_to_node.get(&start)?;
        let end_node = self.position_to_node.get(&destination)?;

        let (_, node_path) = astar(
            &self.graph,
            *start_node,
            |node| node == *end_node,
            |edge| edge.weight().weight,
            |_| 0, // Null heuristic = Dijkstra
        )?;

        let path = node_path.iter().map(|node| self.graph[*node]).collect();
        Route::new(path)
    }
}
