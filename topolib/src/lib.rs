//! # Network Topology Library
//!
//! Turns an electrical network model (elements and the connections between them) into an
//! undirected graph or a rooted forest, and answers structural questions about it: simple paths
//! between two nodes, the shortest and longest of them, which root systems are connected to each
//! other, and which nodes cannot be reached from any root.

use serde::{Deserialize, Serialize};

pub mod config;
pub mod connectivity;
pub mod graph;
pub mod io;
pub mod model;
pub mod paths;
pub mod tree;
pub mod types;
pub mod utils;

pub use config::Config;
pub use graph::Graph;
pub use model::NetworkModel;


/// Represents the reasons why building or querying a network structure might fail.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, thiserror::Error)]
#[serde(tag = "type", content = "content")]
pub enum TopologyError {
    /// A connection references an unknown element, or an element record is incomplete.
    #[error("Malformed model: {0}")]
    MalformedModel(String),
    /// A queried node does not exist in the graph.
    #[error("Node not found: {0}")]
    NodeNotFound(String),
    /// No path exists between the two nodes.
    #[error("No path from {from} to {to}")]
    NoPath { from: String, to: String },
    /// Path exploration gave up after the configured number of steps.
    #[error("Exploration stopped after {explored} steps (limit: {limit})")]
    ResourceExhaustion { explored: usize, limit: usize },
}

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, TopologyError>;
