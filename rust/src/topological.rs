//! Whole-graph topological sort using Kahn's algorithm.
//!
//! Each pass drains the entire ready queue as one level, so the result carries
//! BFS layers alongside the total order. Nodes left over when the queue runs
//! dry are handed to the cycle detector; a cyclic graph still yields a
//! `TopologicalSort`, just with a partial order and non-empty `cycles`.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use thiserror::Error;

use crate::config::EngineConfig;
use crate::critical_path::calculate_critical_path;
use crate::cycles::detect_cycles_in_subset;
use crate::graph::{DependencyGraph, GraphError};
use crate::models::TopologicalSort;
use crate::parallel::parallel_groups;
use crate::{log_changes, log_debug};

pub const ALGORITHM_KAHN: &str = "kahn";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SortError {
    /// The graph's maps disagree badly enough that no order can be trusted.
    #[error("Topological sort failed: {0}")]
    SortFailed(#[from] GraphError),
}

/// Sort `graph` without touching it.
///
/// In-degrees are copied before being decremented, so the graph stays
/// readable by others during the sort.
///
/// # Returns
/// * `Ok(TopologicalSort)` - complete when `cycles` is empty, partial otherwise
/// * `Err(SortError::SortFailed)` - adjacency names unknown nodes, in-degrees
///   are missing or disagree with the adjacency list, or nodes list edges that
///   do not exist
pub fn topological_sort(
    graph: &DependencyGraph,
    config: &EngineConfig,
) -> Result<TopologicalSort, SortError> {
    let verbosity = config.verbosity;

    let mut in_degree = checked_in_degrees(graph)?;

    let mut queue: VecDeque<&str> = graph
        .nodes
        .keys()
        .map(String::as_str)
        .filter(|id| in_degree[id] == 0)
        .collect();

    let mut sorted_nodes: Vec<String> = Vec::with_capacity(graph.len());
    let mut levels: Vec<Vec<String>> = Vec::new();

    while !queue.is_empty() {
        let level_size = queue.len();
        let mut level = Vec::with_capacity(level_size);

        for _ in 0..level_size {
            let Some(node_id) = queue.pop_front() else {
                break;
            };
            level.push(node_id.to_string());

            for successor in graph.successors(node_id) {
                let degree = in_degree.get_mut(successor.as_str()).ok_or_else(|| {
                    GraphError::DanglingSuccessor {
                        from: node_id.to_string(),
                        to: successor.clone(),
                    }
                })?;
                *degree = degree
                    .checked_sub(1)
                    .ok_or_else(|| GraphError::DegreeUnderflow(successor.clone()))?;
                if *degree == 0 {
                    queue.push_back(successor.as_str());
                }
            }
        }

        log_debug!(verbosity, "  Level {}: {:?}", levels.len(), level);
        sorted_nodes.extend(level.iter().cloned());
        levels.push(level);
    }

    let cycles = if sorted_nodes.len() < graph.len() {
        let ordered: FxHashSet<&str> = sorted_nodes.iter().map(String::as_str).collect();
        let remaining: Vec<String> = graph
            .nodes
            .keys()
            .filter(|id| !ordered.contains(id.as_str()))
            .cloned()
            .collect();
        let cycles = detect_cycles_in_subset(graph, &remaining);
        log_changes!(
            verbosity,
            "Sort left {} of {} nodes unordered, {} cycle(s) found",
            remaining.len(),
            graph.len(),
            cycles.len()
        );
        cycles
    } else {
        Vec::new()
    };

    let parallel_groups = parallel_groups(graph, &levels)?;
    let critical = calculate_critical_path(graph, &sorted_nodes, config)?;

    log_changes!(
        verbosity,
        "Sorted {} nodes into {} levels, critical path length {:.2}",
        sorted_nodes.len(),
        levels.len(),
        critical.project_duration
    );

    Ok(TopologicalSort {
        sorted_nodes,
        cycles,
        levels,
        critical_path: critical.critical_path,
        parallel_groups,
        algorithm_used: ALGORITHM_KAHN.to_string(),
    })
}

/// Working copy of the in-degree map, rejected unless every recorded value
/// matches the edges the adjacency list actually holds.
///
/// A stale count would keep its node out of the queue forever without any
/// cycle to explain it.
fn checked_in_degrees(graph: &DependencyGraph) -> Result<FxHashMap<&str, usize>, GraphError> {
    let mut actual: FxHashMap<&str, usize> =
        FxHashMap::with_capacity_and_hasher(graph.len(), Default::default());
    for node_id in graph.nodes.keys() {
        actual.entry(node_id.as_str()).or_insert(0);
        for successor in graph.successors(node_id) {
            let count = actual.entry(successor.as_str()).or_insert(0);
            *count += 1;
            if !graph.contains(successor) {
                return Err(GraphError::DanglingSuccessor {
                    from: node_id.clone(),
                    to: successor.clone(),
                });
            }
        }
    }

    for node_id in graph.nodes.keys() {
        let recorded = graph
            .in_degree
            .get(node_id)
            .copied()
            .ok_or_else(|| GraphError::MissingInDegree(node_id.clone()))?;
        let counted = actual.get(node_id.as_str()).copied().unwrap_or(0);
        if recorded != counted {
            return Err(GraphError::InDegreeMismatch {
                node: node_id.clone(),
                recorded,
                actual: counted,
            });
        }
    }
    Ok(actual)
}

/// Sort `graph` and store the result in `graph.last_sort`.
pub fn sort_and_cache<'g>(
    graph: &'g mut DependencyGraph,
    config: &EngineConfig,
) -> Result<&'g TopologicalSort, SortError> {
    let result = topological_sort(graph, config)?;
    Ok(graph.last_sort.insert(result))
}
