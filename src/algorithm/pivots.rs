use num_traits::{Float, Zero};
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

use crate::algorithm::state::{Key, QueryState};
use crate::graph::Graph;

/// Output of pivot selection for one driver call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PivotSelection {
    /// Sources whose tight subtree within the witnesses holds at least k vertices
    pub pivots: Vec<usize>,

    /// The sources plus every vertex relaxed below the bound during the k rounds
    pub witnesses: Vec<usize>,
}

/// Find pivots as described in Algorithm 1 of the paper.
///
/// Runs k rounds of Bellman-Ford relaxation from all of `sources` at once, collecting every
/// vertex relaxed (improved or tight) below `bound` into the witness set. Tight edges
/// (`d[u] + w == d[v]`) between witnesses then form an implicit forest, and a source becomes
/// a pivot when at least k vertices are reachable from it over that forest.
pub fn find_pivots<W, G>(
    graph: &G,
    bound: &Key<W>,
    sources: &[usize],
    k: usize,
    state: &mut QueryState<W>,
) -> PivotSelection
where
    W: Float + Zero + Debug + Copy + Ord,
    G: Graph<W> + ?Sized,
{
    let mut in_witnesses: HashSet<usize> = HashSet::with_capacity(sources.len() * (k + 1));
    let mut witnesses = Vec::with_capacity(sources.len() * (k + 1));
    let mut roots = Vec::with_capacity(sources.len());
    for &s in sources {
        if in_witnesses.insert(s) {
            witnesses.push(s);
            roots.push(s);
        }
    }

    let mut layer = roots.clone();
    for _ in 0..k {
        let mut next = Vec::new();
        let mut in_next = HashSet::new();

        for &u in &layer {
            for (v, weight) in graph.outgoing_edges(u) {
                if !state.relax(u, v, weight).is_relaxed() || state.key(v) >= *bound {
                    continue;
                }
                if in_next.insert(v) {
                    next.push(v);
                }
                if in_witnesses.insert(v) {
                    witnesses.push(v);
                }
            }
        }

        // Further rounds would relax nothing.
        if next.is_empty() {
            break;
        }
        layer = next;
    }

    let forest = tight_forest(graph, &witnesses, &in_witnesses, state);
    let pivots = roots
        .into_iter()
        .filter(|&root| subtree_size(&forest, root, k) >= k)
        .collect();

    PivotSelection { pivots, witnesses }
}

/// Children over tight edges, restricted to the witness set
fn tight_forest<W, G>(
    graph: &G,
    witnesses: &[usize],
    in_witnesses: &HashSet<usize>,
    state: &QueryState<W>,
) -> HashMap<usize, Vec<usize>>
where
    W: Float + Zero + Debug + Copy + Ord,
    G: Graph<W> + ?Sized,
{
    let mut forest: HashMap<usize, Vec<usize>> = HashMap::new();
    for &u in witnesses {
        if !state.is_reached(u) {
            continue;
        }
        let dist_u = state.distance(u);
        for (v, weight) in graph.outgoing_edges(u) {
            if v != u && in_witnesses.contains(&v) && dist_u + weight == state.distance(v) {
                forest.entry(u).or_default().push(v);
            }
        }
    }
    forest
}

/// Vertices reachable from `root` over the forest, counting stops once `limit` is reached.
///
/// The visited marker belongs to this root alone: a vertex under several roots counts once
/// for each of them.
pub fn subtree_size(forest: &HashMap<usize, Vec<usize>>, root: usize, limit: usize) -> usize {
    let mut visited = HashSet::new();
    let mut stack = vec![root];
    visited.insert(root);
    let mut size = 0;

    while let Some(u) = stack.pop() {
        size += 1;
        if size >= limit {
            break;
        }
        if let Some(children) = forest.get(&u) {
            for &child in children {
                if visited.insert(child) {
                    stack.push(child);
                }
            }
        }
    }
    size
}
