//! Types for critical path analysis.

use rustc_hash::FxHashMap;

/// Per-node timing information from the forward and backward passes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeTiming {
    /// Earliest possible start time (from forward pass).
    pub earliest_start: f64,
    /// earliest_start + duration.
    pub earliest_finish: f64,
    /// Latest allowable start time (from backward pass).
    pub latest_start: f64,
    /// latest_start + duration.
    pub latest_finish: f64,
    /// Slack = latest_start - earliest_start.
    pub slack: f64,
}

impl NodeTiming {
    pub fn is_critical(&self, tolerance: f64) -> bool {
        (self.earliest_start - self.latest_start).abs() <= tolerance
    }
}

/// Result of a critical path calculation.
#[derive(Clone, Debug, Default)]
pub struct CriticalPathAnalysis {
    /// Timing for every node in the sorted sequence.
    pub timings: FxHashMap<String, NodeTiming>,
    /// Zero-slack nodes, in sorted order.
    pub critical_path: Vec<String>,
    /// Latest earliest-finish over all nodes.
    pub project_duration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_timing_critical() {
        let timing = NodeTiming {
            earliest_start: 2.0,
            earliest_finish: 5.0,
            latest_start: 2.005,
            latest_finish: 5.005,
            slack: 0.005,
        };
        assert!(timing.is_critical(0.01));

        let timing_with_slack = NodeTiming {
            earliest_start: 0.0,
            earliest_finish: 5.0,
            latest_start: 2.0,
            latest_finish: 7.0,
            slack: 2.0,
        };
        assert!(!timing_with_slack.is_critical(0.01));
    }
}
