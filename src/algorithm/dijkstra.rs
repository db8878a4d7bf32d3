use num_traits::{Float, Zero};
use std::fmt::Debug;

use crate::algorithm::state::{QueryState, Relaxation};
use crate::algorithm::{ShortestPathAlgorithm, ShortestPathResult};
use crate::data_structures::BinaryHeapWrapper;
use crate::graph::{validate_weights, Graph};
use crate::{Error, Result};

/// Classic Dijkstra's algorithm implementation.
///
/// Uses the same tie-break order as the recursive solver, so on equal-weight alternatives
/// both settle on the same predecessors. Serves as the complete reference the solver is
/// checked against.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dijkstra;

impl Dijkstra {
    /// Creates a new Dijkstra algorithm instance
    pub fn new() -> Self {
        Dijkstra
    }
}

impl<W, G> ShortestPathAlgorithm<W, G> for Dijkstra
where
    W: Float + Zero + Debug + Copy + Ord,
    G: Graph<W> + ?Sized,
{
    fn name(&self) -> &'static str {
        "Dijkstra"
    }

    fn compute_shortest_paths(&self, graph: &G, source: usize) -> Result<ShortestPathResult<W>> {
        if !graph.has_vertex(source) {
            return Err(Error::SourceNotFound);
        }
        validate_weights(graph)?;

        let n = graph.vertex_count();
        let mut state = QueryState::new(n, source);
        let mut settled = vec![false; n];

        let mut queue = BinaryHeapWrapper::new();
        queue.push(source, state.label(source));

        while let Some((u, label)) = queue.pop() {
            // Outdated entry: a better label was pushed after this one
            if settled[u] || label != state.label(u) {
                continue;
            }
            settled[u] = true;

            for (v, weight) in graph.outgoing_edges(u) {
                if !settled[v] && state.relax(u, v, weight) == Relaxation::Improved {
                    queue.push(v, state.label(v));
                }
            }
        }

        Ok(state_to_result(&state))
    }
}

/// Converts a finished query state into the public result shape
pub(crate) fn state_to_result<W>(state: &QueryState<W>) -> ShortestPathResult<W>
where
    W: Float + Zero + Debug + Copy + Ord,
{
    let distances = state
        .distances()
        .iter()
        .map(|&d| if d.is_finite() { Some(d) } else { None })
        .collect();
    let predecessors = state
        .predecessors()
        .iter()
        .zip(state.distances())
        .map(|(&p, d)| if d.is_finite() { p } else { None })
        .collect();

    ShortestPathResult {
        distances,
        predecessors,
        source: state.source(),
    }
}
