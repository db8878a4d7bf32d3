pub mod traits;
pub mod directed;

pub use traits::{validate_weights, Graph, MutableGraph};
pub use directed::DirectedGraph;
