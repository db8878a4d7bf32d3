pub mod base_case;
pub mod bmssp;
pub mod diagnostics;
pub mod dijkstra;
pub mod params;
pub mod pivots;
pub mod solver;
pub mod state;
pub mod traits;

pub use traits::{ShortestPathAlgorithm, ShortestPathResult};
