//! Topology graph construction.
//!
//! This module merges per-device directed neighbor observations into one
//! deduplicated undirected link graph, assigns sequential network identifiers
//! and per-device interface indices, and reports every candidate link it had
//! to drop.

pub mod graph;
pub mod types;

// Re-export key types and functions for easier access
pub use graph::build_topology;
pub use types::{
    DeviceNeighbors, Endpoint, InterfaceAssignment, Link, LinkKey, NeighborObservation,
    NodeInterfaces, ResolutionTier, TopologyGraph, TopologyWarning,
};
