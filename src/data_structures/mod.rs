pub mod frontier;
pub mod priority_queue;

pub use frontier::{Frontier, Pulled};
pub use priority_queue::BinaryHeapWrapper;
