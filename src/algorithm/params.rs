use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Recursion parameters of one query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    /// Pivot-size parameter k = log^(1/3)(n): relaxation rounds in pivot selection, subtree
    /// size that makes a pivot, and vertices settled by a base case
    pub k: usize,

    /// Parameter t = log^(2/3)(n): growth factor of pull sizes and budgets per level
    pub t: usize,

    /// Level of the top-level call, ceil(log n / t)
    pub levels: usize,
}

impl Parameters {
    /// Explicit parameters; k and t are clamped to at least 1
    pub fn new(k: usize, t: usize, levels: usize) -> Self {
        Parameters {
            k: k.max(1),
            t: t.max(1),
            levels,
        }
    }

    /// Parameters derived from the vertex count with base-2 logarithms
    pub fn for_vertex_count(vertex_count: usize) -> Self {
        let log_n = (vertex_count.max(2) as f64).log2();

        // The epsilon keeps exact cubes such as log n = 8 from flooring to one below.
        let k = (log_n.powf(1.0 / 3.0) + 1e-9).floor() as usize;
        let t = (log_n.powf(2.0 / 3.0) + 1e-9).floor() as usize;
        let t = t.max(1);
        let levels = (log_n / t as f64).ceil() as usize;

        Parameters::new(k, t, levels.max(1))
    }

    /// Pull size M = 2^((l-1)·t) of the frontier at `level`
    pub fn pull_size(&self, level: usize) -> usize {
        pow2(level.saturating_sub(1).saturating_mul(self.t))
    }

    /// Completion budget k·2^(l·t) of a call at `level`
    pub fn level_budget(&self, level: usize) -> usize {
        self.k.saturating_mul(pow2(level.saturating_mul(self.t)))
    }
}

fn pow2(exponent: usize) -> usize {
    u32::try_from(exponent)
        .ok()
        .and_then(|e| 1usize.checked_shl(e))
        .unwrap_or(usize::MAX)
}

/// Source of the recursion parameters for a graph of a given size
pub trait ParameterPolicy: Debug {
    fn parameters(&self, vertex_count: usize) -> Parameters;
}

/// k = floor(log^(1/3) n), t = floor(log^(2/3) n), levels = ceil(log n / t)
#[derive(Debug, Clone, Copy, Default)]
pub struct LogarithmicPolicy;

impl ParameterPolicy for LogarithmicPolicy {
    fn parameters(&self, vertex_count: usize) -> Parameters {
        Parameters::for_vertex_count(vertex_count)
    }
}
