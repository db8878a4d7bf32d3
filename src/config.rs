use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::algorithm::bmssp::Limits;
use crate::algorithm::params::Parameters;
use crate::{Error, Result};

/// Tuning knobs of a [`BmsspSolver`](crate::BmsspSolver).
///
/// Every field has a default, so a JSON document only needs to name what it changes:
///
/// ```
/// use pivot_sssp::SolverConfig;
///
/// let config = SolverConfig::from_json(r#"{ "k": 2, "max_iterations": 10000 }"#).unwrap();
/// assert_eq!(config.k, Some(2));
/// assert_eq!(config.stall_threshold, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Overrides the pivot-size parameter k
    pub k: Option<usize>,

    /// Overrides the level growth parameter t
    pub t: Option<usize>,

    /// Overrides the level of the top-level call
    pub levels: Option<usize>,

    /// Consecutive non-progressing pulls tolerated per frame
    pub stall_threshold: usize,

    /// Per-frame iteration cap is `max(min_iteration_cap, iteration_cap_factor * n)`
    pub iteration_cap_factor: usize,
    pub min_iteration_cap: usize,

    /// Driver-loop iterations allowed over the whole query
    pub max_iterations: Option<u64>,

    /// Wall-clock budget of the whole query in milliseconds
    pub time_limit_ms: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        let limits = Limits::default();
        SolverConfig {
            k: None,
            t: None,
            levels: None,
            stall_threshold: limits.stall_threshold,
            iteration_cap_factor: limits.iteration_cap_factor,
            min_iteration_cap: limits.min_iteration_cap,
            max_iterations: None,
            time_limit_ms: None,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    pub fn with_t(mut self, t: usize) -> Self {
        self.t = Some(t);
        self
    }

    pub fn with_levels(mut self, levels: usize) -> Self {
        self.levels = Some(levels);
        self
    }

    pub fn with_stall_threshold(mut self, threshold: usize) -> Self {
        self.stall_threshold = threshold;
        self
    }

    pub fn with_iteration_cap(mut self, factor: usize, minimum: usize) -> Self {
        self.iteration_cap_factor = factor;
        self.min_iteration_cap = minimum;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_ms = Some(u64::try_from(limit.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Parses and validates a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SolverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects settings under which the driver cannot make progress
    pub fn validate(&self) -> Result<()> {
        if self.k == Some(0) {
            return Err(Error::Config("k must be at least 1".to_string()));
        }
        if self.t == Some(0) {
            return Err(Error::Config("t must be at least 1".to_string()));
        }
        if self.stall_threshold == 0 {
            return Err(Error::Config(
                "stall_threshold must be at least 1".to_string(),
            ));
        }
        if self.iteration_cap_factor == 0 && self.min_iteration_cap == 0 {
            return Err(Error::Config(
                "per-frame iteration cap must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    pub fn limits(&self) -> Limits {
        Limits {
            stall_threshold: self.stall_threshold,
            iteration_cap_factor: self.iteration_cap_factor,
            min_iteration_cap: self.min_iteration_cap,
        }
    }

    /// Applies the overrides on top of policy-derived parameters
    pub fn apply(&self, derived: Parameters) -> Parameters {
        Parameters::new(
            self.k.unwrap_or(derived.k),
            self.t.unwrap_or(derived.t),
            self.levels.unwrap_or(derived.levels),
        )
    }
}
