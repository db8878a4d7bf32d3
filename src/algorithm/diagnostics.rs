use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Result;

/// Whether every vertex reachable from the source was reported with its exact distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    Complete,
    /// Some reachable vertices are reported unreached. Every vertex that is reported reached
    /// still carries its exact distance.
    Incomplete,
}

/// Why the driver stopped before exhausting its frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    /// The configured total iteration budget ran out
    IterationBudget,
    /// The configured wall-clock limit ran out
    TimeLimit,
}

/// Read-only statistics of one finished query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub vertex_count: usize,
    pub reachable_count: usize,
    pub unreached_count: usize,
    /// Vertices the driver labelled but the certification pass withheld
    pub uncertified_count: usize,
    pub reachable_pct: f64,

    pub k: usize,
    pub t: usize,
    pub levels: usize,

    /// Driver-loop iterations summed over all frames
    pub iterations: u64,
    pub frames: u64,
    pub base_cases: u64,
    pub stall_detected: bool,
    pub iteration_cap_hit: bool,
    pub abort: Option<AbortReason>,
    pub completion: Completion,

    pub max_distance: Option<f64>,
    pub avg_distance: Option<f64>,
    pub max_path_length: Option<usize>,
    pub avg_path_length: Option<f64>,

    pub elapsed_us: u64,
}

impl Diagnostics {
    pub fn is_complete(&self) -> bool {
        self.completion == Completion::Complete
    }

    /// Serializes the statistics as a JSON object
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f, "BMSSP STATISTICS")?;
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f, "Graph size (n):           {}", self.vertex_count)?;
        writeln!(
            f,
            "Parameters:               k={}, t={}, levels={}",
            self.k, self.t, self.levels
        )?;
        writeln!(
            f,
            "Reachable vertices:       {}/{} ({:.1}%)",
            self.reachable_count, self.vertex_count, self.reachable_pct
        )?;
        writeln!(f, "Unreached:                {}", self.unreached_count)?;
        writeln!(f, "Uncertified (withheld):   {}", self.uncertified_count)?;

        if let (Some(max), Some(avg)) = (self.max_distance, self.avg_distance) {
            writeln!(f, "Max distance found:       {:.4}", max)?;
            writeln!(f, "Avg distance:             {:.4}", avg)?;
        }
        if let (Some(max), Some(avg)) = (self.max_path_length, self.avg_path_length) {
            writeln!(f, "Avg path length (edges):  {:.2}", avg)?;
            writeln!(f, "Max path length:          {}", max)?;
        }

        writeln!(
            f,
            "Driver:                   {} iterations, {} frames, {} base cases",
            self.iterations, self.frames, self.base_cases
        )?;
        writeln!(
            f,
            "Stall / iteration cap:    {} / {}",
            self.stall_detected, self.iteration_cap_hit
        )?;
        if let Some(abort) = self.abort {
            writeln!(f, "Aborted:                  {:?}", abort)?;
        }
        writeln!(f, "Completion:               {:?}", self.completion)?;
        writeln!(f, "Elapsed:                  {} us", self.elapsed_us)?;
        write!(f, "{}", "=".repeat(60))
    }
}
