//! Greedy load balancing of pending work across a fixed agent pool.

use std::cmp::Ordering;
use thiserror::Error;

use crate::config::EngineConfig;
use crate::graph::DependencyGraph;
use crate::models::{Advisory, DependencyNode};
use crate::{log_changes, log_checks};

use super::levels::compute_levels;

/// Why an assignment fell back to empty agent lists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("Agent pool is empty")]
    NoAgents,
    #[error("Work levels unavailable: {0}")]
    LevelsUnavailable(String),
}

/// Distribute every pending node over `agent_count` agents.
///
/// Levels are processed in ascending order. Within a level, nodes are taken by
/// descending priority, then descending duration, and each goes to the agent
/// with the least accumulated duration (lowest index on ties). Completed and
/// in-progress nodes are skipped.
///
/// Always yields exactly `agent_count` lists; on failure they are all empty.
pub fn assign_work(
    graph: &DependencyGraph,
    agent_count: usize,
    config: &EngineConfig,
) -> Advisory<Vec<Vec<String>>> {
    Advisory::from_result(
        "assign_work",
        balance(graph, agent_count, config),
        || vec![Vec::new(); agent_count],
    )
}

/// Sort key: more urgent first, then longer first.
fn placement_order(config: &EngineConfig, a: &DependencyNode, b: &DependencyNode) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| config.duration_of(b).total_cmp(&config.duration_of(a)))
}

/// Index of the least-loaded agent, lowest index winning ties.
fn least_loaded(loads: &[f64]) -> usize {
    let mut best = 0;
    for (agent, &load) in loads.iter().enumerate().skip(1) {
        if load < loads[best] {
            best = agent;
        }
    }
    best
}

fn balance(
    graph: &DependencyGraph,
    agent_count: usize,
    config: &EngineConfig,
) -> Result<Vec<Vec<String>>, AssignmentError> {
    if agent_count == 0 {
        return Err(AssignmentError::NoAgents);
    }
    let verbosity = config.verbosity;

    let levels = compute_levels(graph, config)
        .map_err(|err| AssignmentError::LevelsUnavailable(err.to_string()))?;

    let mut assignments: Vec<Vec<String>> = vec![Vec::new(); agent_count];
    let mut loads = vec![0.0_f64; agent_count];

    for (level, node_ids) in &levels {
        let mut nodes: Vec<&DependencyNode> =
            node_ids.iter().filter_map(|id| graph.node(id)).collect();
        nodes.sort_by(|a, b| placement_order(config, a, b));

        for node in nodes {
            if !node.is_pending() {
                log_checks!(verbosity, "  Skipping {}: completed or in progress", node.id);
                continue;
            }
            let duration = config.duration_of(node);
            let agent = least_loaded(&loads);
            loads[agent] += duration;
            assignments[agent].push(node.id.clone());
            log_changes!(
                verbosity,
                "  Level {}: {} ({:.2}) -> agent {} (load {:.2})",
                level,
                node.id,
                duration,
                agent,
                loads[agent]
            );
        }
    }

    Ok(assignments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_graph(nodes: &[(&str, i32, f64)], edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (id, priority, duration) in nodes {
            graph
                .add_node(DependencyNode::new(*id, *priority).with_duration(*duration))
                .unwrap();
        }
        for (i, (source, target)) in edges.iter().enumerate() {
            graph.connect(&format!("e{}", i), source, target).unwrap();
        }
        graph
    }

    fn load(graph: &DependencyGraph, ids: &[String]) -> f64 {
        let config = EngineConfig::default();
        ids.iter()
            .map(|id| config.duration_of(&graph.nodes[id]))
            .sum()
    }

    #[test]
    fn test_fan_out_two_agents() {
        // A (1) -> B (2), A -> C (3)
        let graph = make_graph(
            &[("A", 0, 1.0), ("B", 0, 2.0), ("C", 0, 3.0)],
            &[("A", "B"), ("A", "C")],
        );

        let result = assign_work(&graph, 2, &EngineConfig::default());
        assert!(!result.is_degraded());

        let agents = result.into_value();
        assert_eq!(agents, vec![vec!["A", "B"], vec!["C"]]);
        assert_eq!(load(&graph, &agents[0]), 3.0);
        assert_eq!(load(&graph, &agents[1]), 3.0);
    }

    #[test]
    fn test_fan_out_three_agents() {
        let graph = make_graph(
            &[("A", 0, 1.0), ("B", 0, 2.0), ("C", 0, 3.0)],
            &[("A", "B"), ("A", "C")],
        );

        let agents = assign_work(&graph, 3, &EngineConfig::default()).into_value();
        assert_eq!(agents, vec![vec!["A"], vec!["C"], vec!["B"]]);
    }

    #[test]
    fn test_priority_placed_before_duration() {
        let graph = make_graph(&[("big", 0, 10.0), ("urgent", 5, 1.0), ("mid", 0, 4.0)], &[]);

        let agents = assign_work(&graph, 2, &EngineConfig::default()).into_value();
        // urgent -> agent 0 (1.0), big -> agent 1 (10.0), mid -> agent 0 (5.0)
        assert_eq!(agents, vec![vec!["urgent", "mid"], vec!["big"]]);
    }

    #[test]
    fn test_skips_completed_and_in_progress() {
        let mut graph = make_graph(&[("a", 0, 1.0), ("b", 0, 1.0), ("c", 0, 1.0)], &[]);
        graph.set_completed("a", true).unwrap();
        graph.set_in_progress("b", true).unwrap();

        let agents = assign_work(&graph, 2, &EngineConfig::default()).into_value();
        assert_eq!(agents, vec![vec!["c"], vec![]]);
    }

    #[test]
    fn test_more_agents_than_work() {
        let graph = make_graph(&[("a", 0, 1.0)], &[]);

        let agents = assign_work(&graph, 4, &EngineConfig::default()).into_value();
        assert_eq!(agents.len(), 4);
        assert_eq!(agents[0], vec!["a"]);
        assert!(agents[1..].iter().all(Vec::is_empty));
    }

    #[test]
    fn test_zero_agents_degrades() {
        let graph = make_graph(&[("a", 0, 1.0)], &[]);

        let result = assign_work(&graph, 0, &EngineConfig::default());
        assert!(result.is_degraded());
        assert_eq!(result.reason(), Some("Agent pool is empty"));
        assert!(result.value().is_empty());
    }

    #[test]
    fn test_broken_graph_degrades_to_empty_lists() {
        let mut graph = make_graph(&[("a", 0, 1.0)], &[]);
        graph
            .nodes
            .get_mut("a")
            .unwrap()
            .dependencies_in
            .insert("phantom".to_string());

        let result = assign_work(&graph, 3, &EngineConfig::default());
        assert!(result.is_degraded());
        assert_eq!(result.value(), &vec![Vec::<String>::new(); 3]);
        assert_eq!(
            result.reason(),
            Some("Work levels unavailable: Edge not found: phantom")
        );
    }

    #[test]
    fn test_least_loaded_tie_breaks_low_index() {
        assert_eq!(least_loaded(&[2.0, 1.0, 1.0]), 1);
        assert_eq!(least_loaded(&[0.0, 0.0]), 0);
        assert_eq!(least_loaded(&[3.0]), 0);
    }
}
