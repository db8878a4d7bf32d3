use log::{debug, trace};
use num_traits::{Float, Zero};
use std::collections::HashSet;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::time::{Duration, Instant};

use crate::algorithm::base_case::base_case;
use crate::algorithm::diagnostics::AbortReason;
use crate::algorithm::params::Parameters;
use crate::algorithm::pivots::find_pivots;
use crate::algorithm::state::{Key, QueryState};
use crate::data_structures::Frontier;
use crate::graph::Graph;
use crate::{Error, Result};

/// Implementation of the Bounded Multi-Source Shortest Path (BMSSP) algorithm
/// as described in the paper "Breaking the Sorting Barrier for Directed Single-Source Shortest Paths"
///
/// The recursion runs on an explicit stack of frames, so the depth of the call tree is not
/// limited by the host stack.
#[derive(Debug)]
pub struct BMSSP<W, G>
where
    W: Float + Zero + Debug + Copy,
    G: Graph<W> + ?Sized,
{
    /// Parameters k, t and the top level
    params: Parameters,

    /// Termination safeguards of every frame
    limits: Limits,

    /// Graph type marker
    _graph_marker: PhantomData<fn(&G)>,

    /// Weight type marker
    _weight_marker: PhantomData<W>,
}

/// Result from a BMSSP execution
#[derive(Debug, Clone)]
pub struct BMSSPResult<W> {
    /// New boundary B': every vertex returned has a key below it
    pub new_bound: Key<W>,

    /// Set of vertices with computed shortest paths
    pub vertices: Vec<usize>,
}

/// Per-frame termination safeguards of the driver loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Consecutive non-progressing pulls tolerated before a frame gives up
    pub stall_threshold: usize,

    /// Per-frame iteration cap is `max(min_iteration_cap, iteration_cap_factor * n)`
    pub iteration_cap_factor: usize,
    pub min_iteration_cap: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            stall_threshold: 5,
            iteration_cap_factor: 10,
            min_iteration_cap: 1000,
        }
    }
}

impl Limits {
    fn iteration_cap(&self, vertex_count: usize) -> usize {
        self.min_iteration_cap
            .max(self.iteration_cap_factor.saturating_mul(vertex_count))
    }
}

/// Counters and cooperative budget of one query, shared by every frame
#[derive(Debug, Clone)]
pub struct ExecutionTracker {
    iterations: u64,
    frames: u64,
    base_cases: u64,
    stall_detected: bool,
    iteration_cap_hit: bool,
    abort: Option<AbortReason>,
    started: Instant,
    max_iterations: Option<u64>,
    time_limit: Option<Duration>,
}

impl Default for ExecutionTracker {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl ExecutionTracker {
    /// Starts the clock. `max_iterations` bounds the driver-loop iterations summed over all
    /// frames; `time_limit` bounds the wall-clock time of the query.
    pub fn new(max_iterations: Option<u64>, time_limit: Option<Duration>) -> Self {
        ExecutionTracker {
            iterations: 0,
            frames: 0,
            base_cases: 0,
            stall_detected: false,
            iteration_cap_hit: false,
            abort: None,
            started: Instant::now(),
            max_iterations,
            time_limit,
        }
    }

    /// Checks the global budget. Once exhausted the tracker stays aborted.
    pub fn should_abort(&mut self) -> bool {
        if self.abort.is_some() {
            return true;
        }
        if let Some(max) = self.max_iterations {
            if self.iterations >= max {
                self.abort = Some(AbortReason::IterationBudget);
            }
        }
        if self.abort.is_none() {
            if let Some(limit) = self.time_limit {
                if self.started.elapsed() >= limit {
                    self.abort = Some(AbortReason::TimeLimit);
                }
            }
        }
        self.abort.is_some()
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn base_cases(&self) -> u64 {
        self.base_cases
    }

    pub fn stall_detected(&self) -> bool {
        self.stall_detected
    }

    pub fn iteration_cap_hit(&self) -> bool {
        self.iteration_cap_hit
    }

    pub fn abort(&self) -> Option<AbortReason> {
        self.abort
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Tracks consecutive non-progressing pulls of one frame.
///
/// A pull makes progress when it holds a vertex not pulled before in the frame or when its
/// child grows the frame's completed set. The guard trips once more than `threshold`
/// consecutive pulls made none.
#[derive(Debug, Clone, Default)]
pub struct StallGuard {
    threshold: usize,
    pulled_before: HashSet<usize>,
    count: usize,
}

impl StallGuard {
    pub fn new(threshold: usize) -> Self {
        StallGuard {
            threshold,
            pulled_before: HashSet::new(),
            count: 0,
        }
    }

    /// Registers a pulled batch; true if it held a vertex not pulled before
    pub fn observe_pull(&mut self, vertices: &[usize]) -> bool {
        let mut fresh = false;
        for &v in vertices {
            fresh |= self.pulled_before.insert(v);
        }
        fresh
    }

    /// Registers the outcome of the child spawned by a pull
    pub fn record(&mut self, fresh: bool, grew: bool) {
        if fresh || grew {
            self.count = 0;
        } else {
            self.count += 1;
        }
    }

    /// Consecutive non-progressing pulls so far
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_stalled(&self) -> bool {
        self.count > self.threshold
    }
}

/// Why a frame stopped pulling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Drained,
    Budget,
    Stall,
    IterationCap,
    Aborted,
}

/// A recursive call in flight, waiting for its child to return
#[derive(Debug)]
struct Pending<W> {
    /// B_i handed to the child
    bound: Key<W>,
    /// S_i handed to the child
    sources: Vec<usize>,
    /// |U| before the child ran
    complete_before: usize,
    /// Whether S_i held a vertex not pulled before in this frame
    fresh: bool,
}

/// One activation of the driver at `level > 0`
#[derive(Debug)]
struct Frame<W>
where
    W: Float + Zero + Debug + Copy + Ord,
{
    level: usize,
    bound: Key<W>,
    witnesses: Vec<usize>,
    frontier: Frontier<W>,
    complete: Vec<usize>,
    in_complete: HashSet<usize>,
    budget: usize,
    pull_size: usize,
    iteration_cap: usize,
    iterations: usize,
    last_child_bound: Option<Key<W>>,
    pending: Option<Pending<W>>,
    stall: StallGuard,
}

enum Step<W> {
    Descend {
        level: usize,
        bound: Key<W>,
        sources: Vec<usize>,
    },
    Return(BMSSPResult<W>),
}

impl<W, G> BMSSP<W, G>
where
    W: Float + Zero + Debug + Copy + Ord,
    G: Graph<W> + ?Sized,
{
    /// Create a new BMSSP algorithm instance with automatically calculated parameters
    pub fn new(vertex_count: usize) -> Self {
        Self::with_params(Parameters::for_vertex_count(vertex_count), Limits::default())
    }

    /// Create a new BMSSP algorithm instance with explicit parameters
    pub fn with_params(params: Parameters, limits: Limits) -> Self {
        BMSSP {
            params,
            limits,
            _graph_marker: PhantomData,
            _weight_marker: PhantomData,
        }
    }

    pub fn params(&self) -> Parameters {
        self.params
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Execute `bmssp(level, bound, sources)`.
    ///
    /// Every source must be complete with a key below `bound`. Returns the new boundary B'
    /// and the vertices completed by this call, all with keys below B'.
    pub fn execute(
        &self,
        graph: &G,
        level: usize,
        bound: Key<W>,
        sources: &[usize],
        state: &mut QueryState<W>,
        tracker: &mut ExecutionTracker,
    ) -> Result<BMSSPResult<W>> {
        if sources.is_empty() {
            return Err(Error::AlgorithmError("Empty sources set".to_string()));
        }
        if let Some(&bad) = sources.iter().find(|&&s| !graph.has_vertex(s)) {
            return Err(Error::InvalidVertex(bad));
        }

        if level == 0 {
            return Ok(self.base_cases(graph, bound, sources, state, tracker));
        }

        let mut stack = vec![self.enter(graph, level, bound, sources, state, tracker)];
        loop {
            let frame = stack
                .last_mut()
                .ok_or_else(|| Error::AlgorithmError("Empty frame stack".to_string()))?;

            match self.step(frame, state, tracker) {
                Step::Descend {
                    level: 0,
                    bound,
                    sources,
                } => {
                    let result = self.base_cases(graph, bound, &sources, state, tracker);
                    self.resume(frame, graph, result, state)?;
                }
                Step::Descend {
                    level,
                    bound,
                    sources,
                } => {
                    let child = self.enter(graph, level, bound, &sources, state, tracker);
                    stack.push(child);
                }
                Step::Return(result) => {
                    stack.pop();
                    match stack.last_mut() {
                        Some(parent) => self.resume(parent, graph, result, state)?,
                        None => return Ok(result),
                    }
                }
            }
        }
    }

    /// Level 0: one base case per source, combined under the tightest returned bound
    fn base_cases(
        &self,
        graph: &G,
        bound: Key<W>,
        sources: &[usize],
        state: &mut QueryState<W>,
        tracker: &mut ExecutionTracker,
    ) -> BMSSPResult<W> {
        if let [source] = sources {
            tracker.base_cases += 1;
            return base_case(graph, bound, *source, self.params.k, state);
        }

        let mut new_bound = bound;
        let mut found = Vec::new();
        for &source in sources {
            tracker.base_cases += 1;
            let result = base_case(graph, bound, source, self.params.k, state);
            new_bound = new_bound.min(result.new_bound);
            found.extend(result.vertices);
        }

        let mut seen = HashSet::with_capacity(found.len());
        let vertices = found
            .into_iter()
            .filter(|&v| seen.insert(v) && state.key(v) < new_bound)
            .collect();
        BMSSPResult {
            new_bound,
            vertices,
        }
    }

    /// Opens a frame: pivot selection, then a fresh frontier seeded with the pivots
    fn enter(
        &self,
        graph: &G,
        level: usize,
        bound: Key<W>,
        sources: &[usize],
        state: &mut QueryState<W>,
        tracker: &mut ExecutionTracker,
    ) -> Frame<W> {
        tracker.frames += 1;

        let selection = find_pivots(graph, &bound, sources, self.params.k, state);
        let mut frontier = Frontier::new(bound);
        for &pivot in &selection.pivots {
            if state.key(pivot) < bound {
                frontier.insert(pivot, state.label(pivot));
            }
        }

        debug!(
            "BMSSP level {}: {} sources, {} pivots, {} witnesses, bound {:?}",
            level,
            sources.len(),
            selection.pivots.len(),
            selection.witnesses.len(),
            bound.distance()
        );

        Frame {
            level,
            bound,
            witnesses: selection.witnesses,
            frontier,
            complete: Vec::new(),
            in_complete: HashSet::new(),
            budget: self.params.level_budget(level),
            pull_size: self.params.pull_size(level),
            iteration_cap: self.limits.iteration_cap(state.vertex_count()),
            iterations: 0,
            last_child_bound: None,
            pending: None,
            stall: StallGuard::new(self.limits.stall_threshold),
        }
    }

    /// Advances a frame to its next recursive call, or closes it
    fn step(
        &self,
        frame: &mut Frame<W>,
        state: &QueryState<W>,
        tracker: &mut ExecutionTracker,
    ) -> Step<W> {
        let exit = if tracker.should_abort() {
            Some(Exit::Aborted)
        } else if frame.complete.len() >= frame.budget {
            Some(Exit::Budget)
        } else if frame.stall.is_stalled() {
            tracker.stall_detected = true;
            Some(Exit::Stall)
        } else if frame.iterations >= frame.iteration_cap {
            tracker.iteration_cap_hit = true;
            Some(Exit::IterationCap)
        } else {
            None
        };
        if let Some(exit) = exit {
            return Step::Return(self.finish(frame, exit, state));
        }

        let pulled = frame.frontier.pull(frame.pull_size, state);
        if pulled.vertices.is_empty() {
            return Step::Return(self.finish(frame, Exit::Drained, state));
        }

        frame.iterations += 1;
        tracker.iterations += 1;

        let fresh = frame.stall.observe_pull(&pulled.vertices);

        trace!(
            "BMSSP level {} pull {}: {} vertices below {:?}",
            frame.level,
            frame.iterations,
            pulled.vertices.len(),
            pulled.bound.distance()
        );

        frame.pending = Some(Pending {
            bound: pulled.bound,
            sources: pulled.vertices.clone(),
            complete_before: frame.complete.len(),
            fresh,
        });
        Step::Descend {
            level: frame.level - 1,
            bound: pulled.bound,
            sources: pulled.vertices,
        }
    }

    /// Folds a child's result into its parent frame and relaxes the edges of the newly
    /// completed vertices.
    ///
    /// Relaxed neighbours with keys in `[B_i, B)` go back into the frontier; keys in
    /// `[B'_i, B_i)` are batch-prepended together with the pulled vertices the child left
    /// unfinished.
    fn resume(
        &self,
        frame: &mut Frame<W>,
        graph: &G,
        result: BMSSPResult<W>,
        state: &mut QueryState<W>,
    ) -> Result<()> {
        let pending = frame
            .pending
            .take()
            .ok_or_else(|| Error::AlgorithmError("Child returned to an idle frame".to_string()))?;
        let BMSSPResult {
            new_bound: child_bound,
            vertices,
        } = result;

        for &u in &vertices {
            if frame.in_complete.insert(u) {
                frame.complete.push(u);
            }
        }

        let mut prepend = Vec::new();
        for &u in &vertices {
            for (v, weight) in graph.outgoing_edges(u) {
                if frame.in_complete.contains(&v) {
                    continue;
                }
                if !state.relax_below(u, v, weight, &frame.bound).is_relaxed() {
                    continue;
                }
                let key = state.key(v);
                if key >= pending.bound {
                    frame.frontier.insert(v, key.label);
                } else if key >= child_bound {
                    prepend.push((v, key.label));
                }
            }
        }
        for &x in &pending.sources {
            if frame.in_complete.contains(&x) {
                continue;
            }
            let key = state.key(x);
            if key >= child_bound && key < pending.bound {
                prepend.push((x, key.label));
            }
        }
        frame.frontier.batch_prepend(prepend);
        frame.last_child_bound = Some(child_bound);

        let grew = frame.complete.len() > pending.complete_before;
        frame.stall.record(pending.fresh, grew);
        Ok(())
    }

    /// Closes a frame: computes B' and adds the witnesses below it to U
    fn finish(&self, frame: &mut Frame<W>, exit: Exit, state: &QueryState<W>) -> BMSSPResult<W> {
        let mut new_bound = frame
            .last_child_bound
            .map_or(frame.bound, |last| last.min(frame.bound));
        if let Some(next) = frame.frontier.min_key(state) {
            new_bound = new_bound.min(next);
        }

        for &x in &frame.witnesses {
            if state.key(x) < new_bound && frame.in_complete.insert(x) {
                frame.complete.push(x);
            }
        }

        debug!(
            "BMSSP level {} done ({:?}) after {} pulls: {} complete, new bound {:?}",
            frame.level,
            exit,
            frame.iterations,
            frame.complete.len(),
            new_bound.distance()
        );

        BMSSPResult {
            new_bound,
            vertices: std::mem::take(&mut frame.complete),
        }
    }
}
