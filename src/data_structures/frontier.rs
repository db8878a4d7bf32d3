use num_traits::{Float, Zero};
use std::collections::HashMap;
use std::fmt::Debug;

use crate::algorithm::state::{Key, Label, QueryState};
use crate::data_structures::BinaryHeapWrapper;

/// Vertices pulled from a [`Frontier`] together with the boundary separating them from the
/// rest of the structure
#[derive(Debug, Clone)]
pub struct Pulled<W> {
    /// Smallest key still in the frontier, or the frontier's own bound once it is empty
    pub bound: Key<W>,
    /// Pulled vertices in ascending key order
    pub vertices: Vec<usize>,
}

/// Simplified frontier structure shared by the recursive driver and the base case.
///
/// Stands in for the block-based list of Lemma 3.3 in the paper:
/// - Insert keeps the better of the old and new label for a vertex (no in-place decrease-key)
/// - BatchPrepend is a loop of inserts, without the amortized O(1) per item of the paper
/// - Pull removes up to M smallest valid entries and reports the next boundary
///
/// Entries are never deleted eagerly. An entry is stale once its label differs from the best
/// label recorded here or from the live label in the [`QueryState`]; stale entries are dropped
/// whenever they reach the top of the heap.
#[derive(Debug)]
pub struct Frontier<W>
where
    W: Float + Zero + Debug + Copy + Ord,
{
    /// Upper bound B of the call owning this frontier
    bound: Key<W>,

    /// Heap of (label, vertex); ordering matches `Key`
    heap: BinaryHeapWrapper<usize, Label<W>>,

    /// Best label inserted per vertex that has not been pulled yet
    best: HashMap<usize, Label<W>>,
}

impl<W> Frontier<W>
where
    W: Float + Zero + Debug + Copy + Ord,
{
    /// Creates an empty frontier for a call bounded by `bound`
    pub fn new(bound: Key<W>) -> Self {
        Frontier {
            bound,
            heap: BinaryHeapWrapper::new(),
            best: HashMap::new(),
        }
    }

    /// Number of vertices holding an entry, stale ones not yet drained included
    pub fn len(&self) -> usize {
        self.best.len()
    }

    /// Inserts `vertex` with `label`, keeping the smaller label if the vertex is already
    /// present. Returns true if the new label was recorded.
    pub fn insert(&mut self, vertex: usize, label: Label<W>) -> bool {
        if let Some(current) = self.best.get(&vertex) {
            if *current <= label {
                return false;
            }
        }
        self.best.insert(vertex, label);
        self.heap.push(vertex, label);
        true
    }

    /// Inserts a batch of entries whose keys are no larger than anything pulled at the
    /// current level. Returns how many labels were recorded.
    pub fn batch_prepend<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = (usize, Label<W>)>,
    {
        items
            .into_iter()
            .filter(|&(vertex, label)| self.insert(vertex, label))
            .count()
    }

    /// Removes up to `batch_size` valid entries with the smallest keys.
    pub fn pull(&mut self, batch_size: usize, state: &QueryState<W>) -> Pulled<W> {
        let mut vertices = Vec::with_capacity(batch_size.min(self.best.len()));
        while vertices.len() < batch_size {
            match self.pop_valid(state) {
                Some(key) => vertices.push(key.vertex),
                None => break,
            }
        }

        let bound = match self.min_key(state) {
            Some(next) if next < self.bound => next,
            _ => self.bound,
        };
        Pulled { bound, vertices }
    }

    /// True iff no valid entry remains; drains stale entries from the top to find out.
    pub fn is_empty(&mut self, state: &QueryState<W>) -> bool {
        self.min_key(state).is_none()
    }

    /// Smallest valid key, draining stale entries above it
    pub fn min_key(&mut self, state: &QueryState<W>) -> Option<Key<W>> {
        while let Some((vertex, label)) = self.heap.peek() {
            if self.is_live(vertex, &label, state) {
                return Some(Key::new(vertex, label));
            }
            self.discard_top();
        }
        None
    }

    fn pop_valid(&mut self, state: &QueryState<W>) -> Option<Key<W>> {
        let key = self.min_key(state)?;
        self.heap.pop();
        self.best.remove(&key.vertex);
        Some(key)
    }

    fn is_live(&self, vertex: usize, label: &Label<W>, state: &QueryState<W>) -> bool {
        self.best.get(&vertex) == Some(label) && state.label(vertex) == *label
    }

    fn discard_top(&mut self) {
        if let Some((vertex, label)) = self.heap.pop() {
            // The vertex's best entry is outdated by the live state: nothing better is queued.
            if self.best.get(&vertex) == Some(&label) {
                self.best.remove(&vertex);
            }
        }
    }
}
