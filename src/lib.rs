//! Pivot SSSP - recursive bounded multi-source shortest paths
//!
//! This library computes single-source shortest-path distances on directed graphs with
//! non-negative real edge weights using the recursive, pivot-driven Bounded Multi-Source
//! Shortest Path (BMSSP) scheme from "Breaking the Sorting Barrier for Directed Single-Source
//! Shortest Paths" by Duan et al. (2025).
//!
//! The frontier structure is a simplified heap rather than the amortized block list of the
//! paper, so the O(m log^(2/3) n) bound is not achieved. Every vertex reported as reached is
//! certified exact; anything the recursion could not settle is reported as unreached and
//! surfaced through [`Diagnostics`].

pub mod algorithm;
pub mod config;
pub mod data_structures;
pub mod graph;

use ordered_float::OrderedFloat;

/// Re-export main types for convenient use
pub use algorithm::{
    bmssp::{BMSSPResult, ExecutionTracker, Limits, StallGuard, BMSSP},
    diagnostics::{AbortReason, Completion, Diagnostics},
    dijkstra::Dijkstra,
    params::{LogarithmicPolicy, ParameterPolicy, Parameters},
    solver::{BmsspSolver, Solution},
    state::{Key, Label, QueryState, Relaxation},
    ShortestPathAlgorithm, ShortestPathResult,
};
pub use config::SolverConfig;
pub use graph::directed::DirectedGraph;

/// Weight type used by the [`solve`] convenience entry point
pub type Distance = OrderedFloat<f64>;

/// Error types for the library
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid vertex ID: {0}")]
    InvalidVertex(usize),

    #[error("Invalid edge: from {0} to {1}")]
    InvalidEdge(usize, usize),

    #[error("Negative edge weight: {0}")]
    NegativeWeight(f64),

    #[error("NaN edge weight: from {0} to {1}")]
    NaNWeight(usize, usize),

    #[error("Source vertex not found in graph")]
    SourceNotFound,

    #[error("Algorithm execution error: {0}")]
    AlgorithmError(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Computes shortest paths from `source` over `vertex_count` vertices and a plain edge list.
///
/// Builds a [`DirectedGraph`] (a repeated `(u, v)` pair keeps its last weight) and runs the
/// default [`BmsspSolver`]. Negative or NaN weights are rejected before any relaxation.
pub fn solve(
    vertex_count: usize,
    edges: &[(usize, usize, f64)],
    source: usize,
) -> Result<Solution<Distance>> {
    let weighted: Vec<(usize, usize, Distance)> = edges
        .iter()
        .map(|&(u, v, w)| (u, v, OrderedFloat(w)))
        .collect();
    let graph = DirectedGraph::from_edges(vertex_count, &weighted)?;
    BmsspSolver::new().solve(&graph, source)
}
