//! Critical Path Method over an already-sorted graph.
//!
//! A forward pass assigns earliest starts in topological order, a backward
//! pass assigns latest starts in reverse order, and nodes whose slack is
//! within tolerance of zero form the critical path.

mod calculation;
mod types;

pub use calculation::calculate_critical_path;
pub use types::{CriticalPathAnalysis, NodeTiming};
