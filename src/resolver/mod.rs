//! Graph resolution: candidate selection, cycle detection, instantiation

pub mod cycle;
pub mod dependency_graph;

pub use dependency_graph::{DependencyGraph, NodeId, NodeState, Resolution};
