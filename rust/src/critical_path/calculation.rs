//! Critical path calculation using forward and backward passes.

use rustc_hash::FxHashMap;

use crate::config::EngineConfig;
use crate::graph::{DependencyGraph, GraphError};
use crate::log_debug;

use super::types::{CriticalPathAnalysis, NodeTiming};

/// Compute earliest/latest starts and the zero-slack path.
///
/// `sorted_nodes` must be a (possibly partial) topological order of `graph`;
/// dependencies and dependents outside it are ignored by both passes, which
/// is what lets a partial sort of a cyclic graph still get a critical path.
///
/// # Arguments
/// * `graph` - Graph the order was computed from
/// * `sorted_nodes` - Node IDs, every dependency before its dependents
/// * `config` - Supplies default duration and slack tolerance
///
/// # Returns
/// * `Err(GraphError)` if a sorted node is missing or lists a missing edge
pub fn calculate_critical_path(
    graph: &DependencyGraph,
    sorted_nodes: &[String],
    config: &EngineConfig,
) -> Result<CriticalPathAnalysis, GraphError> {
    let mut durations: FxHashMap<&str, f64> =
        FxHashMap::with_capacity_and_hasher(sorted_nodes.len(), Default::default());
    for node_id in sorted_nodes {
        let node = graph
            .node(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.clone()))?;
        durations.insert(node_id.as_str(), config.duration_of(node));
    }

    // Forward pass: earliest start = max finish over dependencies.
    let mut timings: FxHashMap<&str, NodeTiming> =
        FxHashMap::with_capacity_and_hasher(sorted_nodes.len(), Default::default());
    for node_id in sorted_nodes {
        let duration = durations[node_id.as_str()];
        let mut earliest_start = 0.0_f64;
        for dep in graph.dependencies(node_id)? {
            if let Some(dep_timing) = timings.get(dep) {
                earliest_start = earliest_start.max(dep_timing.earliest_finish);
            }
        }
        timings.insert(
            node_id.as_str(),
            NodeTiming {
                earliest_start,
                earliest_finish: earliest_start + duration,
                ..NodeTiming::default()
            },
        );
    }

    let project_duration = timings
        .values()
        .map(|t| t.earliest_finish)
        .fold(0.0_f64, f64::max);

    // Backward pass: latest finish = min latest start over dependents.
    for node_id in sorted_nodes.iter().rev() {
        let duration = durations[node_id.as_str()];
        let mut latest_finish: Option<f64> = None;
        for dependent in graph.dependents(node_id)? {
            if let Some(dependent_timing) = timings.get(dependent) {
                let bound = dependent_timing.latest_start;
                latest_finish = Some(latest_finish.map_or(bound, |lf| lf.min(bound)));
            }
        }
        let latest_finish = latest_finish.unwrap_or(project_duration);

        if let Some(timing) = timings.get_mut(node_id.as_str()) {
            timing.latest_finish = latest_finish;
            timing.latest_start = latest_finish - duration;
            timing.slack = timing.latest_start - timing.earliest_start;
            log_debug!(
                config.verbosity,
                "  {}: es={:.2} ls={:.2} slack={:.2}",
                node_id,
                timing.earliest_start,
                timing.latest_start,
                timing.slack
            );
        }
    }

    let critical_path: Vec<String> = sorted_nodes
        .iter()
        .filter(|id| {
            timings
                .get(id.as_str())
                .is_some_and(|t| t.is_critical(config.critical_path_tolerance))
        })
        .cloned()
        .collect();

    Ok(CriticalPathAnalysis {
        timings: timings
            .into_iter()
            .map(|(id, timing)| (id.to_string(), timing))
            .collect(),
        critical_path,
        project_duration,
    })
}
