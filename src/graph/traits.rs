use std::fmt::Debug;
use num_traits::{Float, Zero};

use crate::{Error, Result};

/// Trait representing a weighted directed graph
///
/// Shortest-path queries only ever read through this trait; the graph stays immutable for the
/// whole query and can be shared between queries.
pub trait Graph<W>: Debug
where
    W: Float + Zero + Debug + Copy,
{
    /// Returns the number of vertices in the graph
    fn vertex_count(&self) -> usize;

    /// Returns the number of edges in the graph
    fn edge_count(&self) -> usize;

    /// Returns an iterator over the outgoing edges from a vertex
    fn outgoing_edges(&self, vertex: usize) -> Box<dyn Iterator<Item = (usize, W)> + '_>;

    /// Returns true if the vertex exists in the graph
    fn has_vertex(&self, vertex: usize) -> bool;

    /// Returns true if there's an edge between the two vertices
    fn has_edge(&self, from: usize, to: usize) -> bool;

    /// Gets the weight of an edge if it exists
    fn get_edge_weight(&self, from: usize, to: usize) -> Option<W>;
}

/// Trait for mutable graph operations
pub trait MutableGraph<W>: Graph<W>
where
    W: Float + Zero + Debug + Copy,
{
    /// Adds a vertex to the graph and returns its ID
    fn add_vertex(&mut self) -> usize;

    /// Adds a directed edge between vertices with the given weight.
    /// An existing edge between the same endpoints takes the new weight.
    fn add_edge(&mut self, from: usize, to: usize, weight: W) -> bool;

    /// Removes an edge from the graph
    fn remove_edge(&mut self, from: usize, to: usize) -> bool;
}

/// Fails on the first negative or NaN edge weight.
pub fn validate_weights<W, G>(graph: &G) -> Result<()>
where
    W: Float + Zero + Debug + Copy,
    G: Graph<W> + ?Sized,
{
    for u in 0..graph.vertex_count() {
        for (v, weight) in graph.outgoing_edges(u) {
            if weight.is_nan() {
                return Err(Error::NaNWeight(u, v));
            }
            if weight < W::zero() {
                return Err(Error::NegativeWeight(weight.to_f64().unwrap_or(f64::NAN)));
            }
        }
    }
    Ok(())
}
