use log::{info, warn};
use num_traits::{Float, Zero};
use std::collections::VecDeque;
use std::fmt::Debug;

use crate::algorithm::bmssp::{ExecutionTracker, BMSSP};
use crate::algorithm::diagnostics::{Completion, Diagnostics};
use crate::algorithm::dijkstra::state_to_result;
use crate::algorithm::params::{LogarithmicPolicy, ParameterPolicy, Parameters};
use crate::algorithm::state::{Key, QueryState};
use crate::algorithm::{ShortestPathAlgorithm, ShortestPathResult};
use crate::config::SolverConfig;
use crate::graph::{validate_weights, Graph};
use crate::{Error, Result};

/// Single-source shortest paths through the recursive BMSSP driver.
///
/// A query runs the driver from the top level with an unbounded boundary, then certifies the
/// labels it produced, so a vertex reported as reached always carries its exact distance.
/// A run cut short by a budget keeps every label settled below the first outstanding
/// relaxation.
#[derive(Debug, Clone, Default)]
pub struct BmsspSolver<P = LogarithmicPolicy> {
    config: SolverConfig,
    policy: P,
}

/// Outcome of one query: the distances and predecessors plus the run's statistics
#[derive(Debug, Clone)]
pub struct Solution<W>
where
    W: Float + Zero + Debug + Copy,
{
    result: ShortestPathResult<W>,
    diagnostics: Diagnostics,
}

impl<W> Solution<W>
where
    W: Float + Zero + Debug + Copy,
{
    pub fn result(&self) -> &ShortestPathResult<W> {
        &self.result
    }

    pub fn distances(&self) -> &[Option<W>] {
        &self.result.distances
    }

    pub fn predecessors(&self) -> &[Option<usize>] {
        &self.result.predecessors
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_result(self) -> ShortestPathResult<W> {
        self.result
    }
}

impl BmsspSolver<LogarithmicPolicy> {
    /// Solver with the default configuration and logarithmic parameters
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        BmsspSolver {
            config,
            policy: LogarithmicPolicy,
        }
    }
}

impl<P> BmsspSolver<P>
where
    P: ParameterPolicy,
{
    /// Solver deriving k, t and the top level from a custom policy
    pub fn with_policy(config: SolverConfig, policy: P) -> Self {
        BmsspSolver { config, policy }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Parameters used for a graph of `vertex_count` vertices, config overrides applied
    pub fn parameters(&self, vertex_count: usize) -> Parameters {
        self.config.apply(self.policy.parameters(vertex_count))
    }

    /// Computes shortest paths from `source`.
    ///
    /// Fails on an unknown source, a negative or NaN weight, or an invalid configuration.
    /// Running out of budget is not an error: the solution is then marked incomplete.
    pub fn solve<W, G>(&self, graph: &G, source: usize) -> Result<Solution<W>>
    where
        W: Float + Zero + Debug + Copy + Ord,
        G: Graph<W> + ?Sized,
    {
        if !graph.has_vertex(source) {
            return Err(Error::SourceNotFound);
        }
        validate_weights(graph)?;
        self.config.validate()?;

        let n = graph.vertex_count();
        let params = self.parameters(n);
        let driver = BMSSP::<W, G>::with_params(params, self.config.limits());
        let mut tracker = ExecutionTracker::new(self.config.max_iterations, self.config.time_limit());
        let mut state = QueryState::new(n, source);

        driver.execute(
            graph,
            params.levels,
            Key::unbounded(),
            &[source],
            &mut state,
            &mut tracker,
        )?;

        let Certification { withheld, violated } = certify(graph, &state);
        let uncertified_count = withheld.iter().filter(|&&w| w).count();

        let mut result = state_to_result(&state);
        for v in (0..n).filter(|&v| withheld[v]) {
            result.distances[v] = None;
            result.predecessors[v] = None;
        }

        let completion = if violated || tracker.abort().is_some() {
            Completion::Incomplete
        } else {
            Completion::Complete
        };
        let diagnostics = summarize(&state, &result, params, &tracker, uncertified_count, completion);

        info!(
            "BMSSP solved n={} from {}: {}/{} reached, {} iterations, {} frames",
            n,
            source,
            diagnostics.reachable_count,
            n,
            diagnostics.iterations,
            diagnostics.frames
        );
        if !diagnostics.is_complete() {
            warn!(
                "BMSSP result incomplete: {} unreached, {} uncertified, stall={}, cap={}, abort={:?}",
                diagnostics.unreached_count,
                diagnostics.uncertified_count,
                diagnostics.stall_detected,
                diagnostics.iteration_cap_hit,
                diagnostics.abort
            );
        }

        Ok(Solution {
            result,
            diagnostics,
        })
    }
}

impl<W, G, P> ShortestPathAlgorithm<W, G> for BmsspSolver<P>
where
    W: Float + Zero + Debug + Copy + Ord,
    G: Graph<W> + ?Sized,
    P: ParameterPolicy,
{
    fn name(&self) -> &'static str {
        "BMSSP"
    }

    fn compute_shortest_paths(&self, graph: &G, source: usize) -> Result<ShortestPathResult<W>> {
        self.solve(graph, source).map(Solution::into_result)
    }
}

/// Labels that could not be proven final after a run
struct Certification {
    /// Reached vertices whose label cannot be trusted
    withheld: Vec<bool>,
    /// Whether some edge could still improve a label
    violated: bool,
}

/// Marks every vertex whose label cannot be trusted.
///
/// An edge `(u, v, w)` with `d[u] + w < d[v]` is violated, edges into unreached vertices
/// included. The leak is the smallest `d[u] + w` over violated edges. A label is kept when
/// no violated edge reaches it in the graph, or when it does not exceed the leak: a wrong
/// label needs a violated edge upstream whose candidate is at most its true distance. The
/// source keeps its distance of zero.
fn certify<W, G>(graph: &G, state: &QueryState<W>) -> Certification
where
    W: Float + Zero + Debug + Copy + Ord,
    G: Graph<W> + ?Sized,
{
    let n = graph.vertex_count();
    let mut suspect = vec![false; n];
    let mut queue = VecDeque::new();
    let mut leak: Option<W> = None;
    let source = state.source();

    for u in (0..n).filter(|&u| state.is_reached(u)) {
        let dist_u = state.distance(u);
        for (v, weight) in graph.outgoing_edges(u) {
            let candidate = dist_u + weight;
            if v == source || candidate >= state.distance(v) {
                continue;
            }
            leak = match leak {
                Some(current) if current <= candidate => Some(current),
                _ => Some(candidate),
            };
            if !suspect[v] {
                suspect[v] = true;
                queue.push_back(v);
            }
        }
    }

    while let Some(u) = queue.pop_front() {
        for (v, _) in graph.outgoing_edges(u) {
            if v != source && !suspect[v] {
                suspect[v] = true;
                queue.push_back(v);
            }
        }
    }

    let withheld = match leak {
        Some(leak) => (0..n)
            .map(|v| suspect[v] && state.is_reached(v) && state.distance(v) > leak)
            .collect(),
        None => vec![false; n],
    };
    Certification {
        withheld,
        violated: leak.is_some(),
    }
}

fn summarize<W>(
    state: &QueryState<W>,
    result: &ShortestPathResult<W>,
    params: Parameters,
    tracker: &ExecutionTracker,
    uncertified_count: usize,
    completion: Completion,
) -> Diagnostics
where
    W: Float + Zero + Debug + Copy + Ord,
{
    let vertex_count = result.distances.len();
    let reached: Vec<usize> = (0..vertex_count).filter(|&v| result.is_reached(v)).collect();
    let reachable_count = reached.len();

    let distances: Vec<f64> = reached
        .iter()
        .filter_map(|&v| state.distance(v).to_f64())
        .collect();
    let path_lengths: Vec<usize> = reached.iter().map(|&v| state.path_length(v)).collect();

    let max_distance = distances.iter().copied().reduce(f64::max);
    let avg_distance = mean(distances.iter().copied());
    let max_path_length = path_lengths.iter().copied().max();
    let avg_path_length = mean(path_lengths.iter().map(|&h| h as f64));

    let reachable_pct = if vertex_count == 0 {
        0.0
    } else {
        100.0 * reachable_count as f64 / vertex_count as f64
    };

    Diagnostics {
        vertex_count,
        reachable_count,
        unreached_count: vertex_count - reachable_count,
        uncertified_count,
        reachable_pct,
        k: params.k,
        t: params.t,
        levels: params.levels,
        iterations: tracker.iterations(),
        frames: tracker.frames(),
        base_cases: tracker.base_cases(),
        stall_detected: tracker.stall_detected(),
        iteration_cap_hit: tracker.iteration_cap_hit(),
        abort: tracker.abort(),
        completion,
        max_distance,
        avg_distance,
        max_path_length,
        avg_path_length,
        elapsed_us: u64::try_from(tracker.elapsed().as_micros()).unwrap_or(u64::MAX),
    }
}

fn mean<I: Iterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), x| (s + x, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
