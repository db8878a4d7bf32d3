use num_traits::{Float, Zero};
use std::fmt::Debug;

/// Tie-break tuple of a vertex's current best path: `(distance, edge count, predecessor)`.
///
/// Labels compare lexicographically. On equal distance the path with fewer edges wins, and on
/// equal edge count the lower predecessor id wins (`None` sorts first, so the source label is
/// the smallest label there is).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label<W> {
    /// Total path weight
    pub dist: W,
    /// Number of edges on the path
    pub hops: usize,
    /// Last vertex before this one on the path
    pub pred: Option<usize>,
}

impl<W> Label<W>
where
    W: Float + Zero + Debug + Copy + Ord,
{
    /// Label of the query source
    pub fn origin() -> Self {
        Label {
            dist: W::zero(),
            hops: 0,
            pred: None,
        }
    }

    /// Label of a vertex no path has reached yet
    pub fn unreached() -> Self {
        Label {
            dist: W::infinity(),
            hops: usize::MAX,
            pred: None,
        }
    }

    /// True if the label describes an actual finite path
    pub fn is_reached(&self) -> bool {
        self.dist.is_finite()
    }

    /// The label obtained by following edge `(from, _)` of weight `weight` after this path
    pub fn extend(&self, from: usize, weight: W) -> Self {
        Label {
            dist: self.dist + weight,
            hops: self.hops.saturating_add(1),
            pred: Some(from),
        }
    }
}

/// Total order over vertices: a label plus the vertex it belongs to.
///
/// Keys of distinct vertices never compare equal, which lets a key act as an exact boundary
/// between "settled in this call" and "left for later" even when many vertices share a
/// distance (zero-weight edges, equal-weight paths).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key<W> {
    pub label: Label<W>,
    pub vertex: usize,
}

impl<W> Key<W>
where
    W: Float + Zero + Debug + Copy + Ord,
{
    pub fn new(vertex: usize, label: Label<W>) -> Self {
        Key { label, vertex }
    }

    /// A boundary above every key of a reached vertex
    pub fn unbounded() -> Self {
        Key {
            label: Label {
                dist: W::infinity(),
                hops: usize::MAX,
                pred: Some(usize::MAX),
            },
            vertex: usize::MAX,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        *self == Self::unbounded()
    }

    /// Scalar distance component of the key
    pub fn distance(&self) -> W {
        self.label.dist
    }
}

/// Outcome of relaxing a single edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relaxation {
    /// The candidate label was strictly better and has been recorded
    Improved,
    /// The candidate label equals the recorded one (the edge is the current best edge)
    Tight,
    /// The candidate was worse, unreachable, or outside the bound
    Rejected,
}

impl Relaxation {
    /// Improved or tight, i.e. `d[u] + w <= d[v]` under the tie-break order
    pub fn is_relaxed(self) -> bool {
        !matches!(self, Relaxation::Rejected)
    }
}

/// Distance, predecessor and path-length maps of one shortest path query.
///
/// Exclusively owned by a single query and passed by mutable reference through every
/// recursive call. The three maps only change together and a vertex's label only ever
/// decreases.
#[derive(Debug, Clone)]
pub struct QueryState<W> {
    source: usize,
    distances: Vec<W>,
    predecessors: Vec<Option<usize>>,
    path_lengths: Vec<usize>,
}

impl<W> QueryState<W>
where
    W: Float + Zero + Debug + Copy + Ord,
{
    /// Fresh state for `vertex_count` vertices: everything unreached except `source` at 0.
    /// Callers guarantee `source < vertex_count`.
    pub fn new(vertex_count: usize, source: usize) -> Self {
        let unreached = Label::<W>::unreached();
        let mut state = QueryState {
            source,
            distances: vec![unreached.dist; vertex_count],
            predecessors: vec![None; vertex_count],
            path_lengths: vec![unreached.hops; vertex_count],
        };
        if source < vertex_count {
            state.set_label(source, Label::origin());
        }
        state
    }

    pub fn source(&self) -> usize {
        self.source
    }

    pub fn vertex_count(&self) -> usize {
        self.distances.len()
    }

    pub fn distance(&self, vertex: usize) -> W {
        self.distances[vertex]
    }

    pub fn predecessor(&self, vertex: usize) -> Option<usize> {
        self.predecessors[vertex]
    }

    pub fn path_length(&self, vertex: usize) -> usize {
        self.path_lengths[vertex]
    }

    pub fn is_reached(&self, vertex: usize) -> bool {
        self.distances[vertex].is_finite()
    }

    pub fn label(&self, vertex: usize) -> Label<W> {
        Label {
            dist: self.distances[vertex],
            hops: self.path_lengths[vertex],
            pred: self.predecessors[vertex],
        }
    }

    pub fn key(&self, vertex: usize) -> Key<W> {
        Key::new(vertex, self.label(vertex))
    }

    pub fn distances(&self) -> &[W] {
        &self.distances
    }

    pub fn predecessors(&self) -> &[Option<usize>] {
        &self.predecessors
    }

    pub fn path_lengths(&self) -> &[usize] {
        &self.path_lengths
    }

    /// Relaxes edge `(from, to)` of weight `weight` with the tie-break order.
    pub fn relax(&mut self, from: usize, to: usize, weight: W) -> Relaxation {
        self.relax_with(from, to, weight, None)
    }

    /// Like [`relax`](Self::relax) but rejects candidates whose key is not below `bound`;
    /// nothing is recorded for a rejected candidate.
    pub fn relax_below(&mut self, from: usize, to: usize, weight: W, bound: &Key<W>) -> Relaxation {
        self.relax_with(from, to, weight, Some(bound))
    }

    fn relax_with(&mut self, from: usize, to: usize, weight: W, bound: Option<&Key<W>>) -> Relaxation {
        let candidate = self.label(from).extend(from, weight);
        if !candidate.is_reached() {
            return Relaxation::Rejected;
        }
        if let Some(bound) = bound {
            if Key::new(to, candidate) >= *bound {
                return Relaxation::Rejected;
            }
        }

        let current = self.label(to);
        if candidate < current {
            self.set_label(to, candidate);
            Relaxation::Improved
        } else if candidate == current {
            Relaxation::Tight
        } else {
            Relaxation::Rejected
        }
    }

    fn set_label(&mut self, vertex: usize, label: Label<W>) {
        debug_assert!(label <= self.label(vertex), "labels must never increase");
        self.distances[vertex] = label.dist;
        self.path_lengths[vertex] = label.hops;
        self.predecessors[vertex] = label.pred;
    }
}
