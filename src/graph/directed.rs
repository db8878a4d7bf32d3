use crate::graph::traits::{validate_weights, Graph, MutableGraph};
use crate::{Error, Result};
use num_traits::{Float, Zero};
use std::fmt::Debug;

/// A directed graph implementation using adjacency lists
#[derive(Debug, Clone)]
pub struct DirectedGraph<W>
where
    W: Float + Zero + Debug + Copy,
{
    /// Outgoing edges for each vertex: vertex_id -> [(target_vertex, weight)]
    outgoing_edges: Vec<Vec<(usize, W)>>,

    /// Total number of stored edges
    edge_count: usize,
}

impl<W> Default for DirectedGraph<W>
where
    W: Float + Zero + Debug + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<W> DirectedGraph<W>
where
    W: Float + Zero + Debug + Copy,
{
    /// Creates a new empty directed graph
    pub fn new() -> Self {
        DirectedGraph {
            outgoing_edges: Vec::new(),
            edge_count: 0,
        }
    }

    /// Creates a new directed graph with the specified number of vertices and no edges
    pub fn with_capacity(vertices: usize) -> Self {
        DirectedGraph {
            outgoing_edges: vec![Vec::new(); vertices],
            edge_count: 0,
        }
    }

    /// Builds a graph over `vertex_count` vertices from `(from, to, weight)` triples.
    ///
    /// Weights are validated before anything is stored; a repeated `(from, to)` pair keeps
    /// the weight of its last occurrence.
    pub fn from_edges(vertex_count: usize, edges: &[(usize, usize, W)]) -> Result<Self> {
        let mut graph = Self::with_capacity(vertex_count);
        for &(from, to, weight) in edges {
            if weight.is_nan() {
                return Err(Error::NaNWeight(from, to));
            }
            if weight < W::zero() {
                return Err(Error::NegativeWeight(weight.to_f64().unwrap_or(f64::NAN)));
            }
            if !graph.add_edge(from, to, weight) {
                return Err(Error::InvalidEdge(from, to));
            }
        }
        Ok(graph)
    }

    /// Validate that the graph has no negative or NaN weights
    pub fn validate(&self) -> Result<()> {
        validate_weights(self)
    }
}

impl<W> Graph<W> for DirectedGraph<W>
where
    W: Float + Zero + Debug + Copy,
{
    fn vertex_count(&self) -> usize {
        self.outgoing_edges.len()
    }

    fn edge_count(&self) -> usize {
        self.edge_count
    }

    fn outgoing_edges(&self, vertex: usize) -> Box<dyn Iterator<Item = (usize, W)> + '_> {
        match self.outgoing_edges.get(vertex) {
            Some(edges) => Box::new(edges.iter().copied()),
            None => Box::new(std::iter::empty()),
        }
    }

    fn has_vertex(&self, vertex: usize) -> bool {
        vertex < self.outgoing_edges.len()
    }

    fn has_edge(&self, from: usize, to: usize) -> bool {
        self.get_edge_weight(from, to).is_some()
    }

    fn get_edge_weight(&self, from: usize, to: usize) -> Option<W> {
        self.outgoing_edges
            .get(from)?
            .iter()
            .find(|(target, _)| *target == to)
            .map(|(_, weight)| *weight)
    }
}

impl<W> MutableGraph<W> for DirectedGraph<W>
where
    W: Float + Zero + Debug + Copy,
{
    fn add_vertex(&mut self) -> usize {
        self.outgoing_edges.push(Vec::new());
        self.outgoing_edges.len() - 1
    }

    // Weights are not checked here; solvers reject negative or NaN weights up front.
    fn add_edge(&mut self, from: usize, to: usize, weight: W) -> bool {
        if !self.has_vertex(to) {
            return false;
        }
        let Some(outgoing) = self.outgoing_edges.get_mut(from) else {
            return false;
        };

        if let Some(edge) = outgoing.iter_mut().find(|(target, _)| *target == to) {
            edge.1 = weight;
            return true;
        }

        outgoing.push((to, weight));
        self.edge_count += 1;
        true
    }

    fn remove_edge(&mut self, from: usize, to: usize) -> bool {
        let Some(outgoing) = self.outgoing_edges.get_mut(from) else {
            return false;
        };
        let len_before = outgoing.len();
        outgoing.retain(|(target, _)| *target != to);
        let removed = len_before - outgoing.len();
        self.edge_count -= removed;
        removed > 0
    }
}
