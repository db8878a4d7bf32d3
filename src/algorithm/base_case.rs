use num_traits::{Float, Zero};
use std::collections::HashSet;
use std::fmt::Debug;

use crate::algorithm::bmssp::BMSSPResult;
use crate::algorithm::state::{Key, QueryState};
use crate::data_structures::Frontier;
use crate::graph::Graph;

/// Base case of the BMSSP recursion (level 0): a mini-Dijkstra from a single complete vertex.
///
/// Settles vertices in key order until k + 1 of them are settled, the frontier runs dry, or
/// only keys at or above `bound` remain. With at most k settled vertices the bound is kept and
/// every settled vertex is returned. Otherwise the key of the (k+1)-th vertex becomes the new
/// bound and only the first k are returned.
pub fn base_case<W, G>(
    graph: &G,
    bound: Key<W>,
    source: usize,
    k: usize,
    state: &mut QueryState<W>,
) -> BMSSPResult<W>
where
    W: Float + Zero + Debug + Copy + Ord,
    G: Graph<W> + ?Sized,
{
    if state.key(source) >= bound {
        return BMSSPResult {
            new_bound: bound,
            vertices: Vec::new(),
        };
    }

    let mut frontier = Frontier::new(bound);
    frontier.insert(source, state.label(source));

    let mut settled = Vec::with_capacity(k + 1);
    let mut done = HashSet::with_capacity(k + 1);

    while settled.len() <= k {
        let Some(&u) = frontier.pull(1, state).vertices.first() else {
            break;
        };
        if !done.insert(u) {
            continue;
        }
        settled.push(u);

        for (v, weight) in graph.outgoing_edges(u) {
            if done.contains(&v) {
                continue;
            }
            if state.relax_below(u, v, weight, &bound).is_relaxed() {
                frontier.insert(v, state.label(v));
            }
        }
    }

    if settled.len() <= k {
        return BMSSPResult {
            new_bound: bound,
            vertices: settled,
        };
    }

    // Vertices were settled in ascending key order, so the last one is the (k+1)-th.
    let new_bound = match settled.pop() {
        Some(last) => state.key(last),
        None => bound,
    };
    BMSSPResult {
        new_bound,
        vertices: settled,
    }
}
