//! Traffic Grid Simulation Library
//!
//! A discrete-time grid city simulation where an operator toggles lights to
//! keep shortest-path routed vehicles from colliding.

pub mod simulation;
