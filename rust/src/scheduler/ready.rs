//! Ready-work selection.

use crate::config::EngineConfig;
use crate::graph::{DependencyGraph, GraphError};
use crate::log_checks;
use crate::models::{Advisory, DependencyNode};

/// Nodes that can start now, highest priority first.
///
/// A node is ready when it is neither completed nor in progress and every
/// dependency is completed or absent from the graph (absent dependencies are
/// treated as satisfied, matching `resolve_dependencies`). Equal priorities
/// keep node-ID order.
pub fn ready_work(graph: &DependencyGraph, config: &EngineConfig) -> Advisory<Vec<String>> {
    Advisory::from_result("ready_work", collect_ready(graph, config), Vec::new)
}

fn collect_ready(graph: &DependencyGraph, config: &EngineConfig) -> Result<Vec<String>, GraphError> {
    let verbosity = config.verbosity;
    let mut ready: Vec<(&str, &DependencyNode)> = Vec::new();

    for (node_id, node) in &graph.nodes {
        if !node.is_pending() {
            continue;
        }

        let blocker = graph
            .dependencies(node_id)?
            .into_iter()
            .find(|dep| graph.node(dep).is_some_and(|d| !d.is_completed));
        match blocker {
            Some(dep) => log_checks!(verbosity, "  {} blocked by {}", node_id, dep),
            None => ready.push((node_id.as_str(), node)),
        }
    }

    ready.sort_by(|(_, a), (_, b)| b.priority.cmp(&a.priority));
    Ok(ready.into_iter().map(|(id, _)| id.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_graph(nodes: &[(&str, i32)], edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (id, priority) in nodes {
            graph.add_node(DependencyNode::new(*id, *priority)).unwrap();
        }
        for (i, (source, target)) in edges.iter().enumerate() {
            graph.connect(&format!("e{}", i), source, target).unwrap();
        }
        graph
    }

    #[test]
    fn test_roots_are_ready_by_priority() {
        let graph = make_graph(&[("a", 1), ("b", 5), ("c", 3)], &[]);

        let ready = ready_work(&graph, &EngineConfig::default());
        assert!(!ready.is_degraded());
        assert_eq!(ready.into_value(), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_equal_priority_keeps_id_order() {
        let graph = make_graph(&[("b", 1), ("a", 1)], &[]);

        let ready = ready_work(&graph, &EngineConfig::default()).into_value();
        assert_eq!(ready, vec!["a", "b"]);
    }

    #[test]
    fn test_blocked_until_dependency_completes() {
        let mut graph = make_graph(&[("a", 0), ("b", 9)], &[("a", "b")]);
        let config = EngineConfig::default();

        assert_eq!(ready_work(&graph, &config).into_value(), vec!["a"]);

        graph.set_completed("a", true).unwrap();
        assert_eq!(ready_work(&graph, &config).into_value(), vec!["b"]);
    }

    #[test]
    fn test_excludes_completed_and_in_progress() {
        let mut graph = make_graph(&[("a", 0), ("b", 0), ("c", 0)], &[]);
        graph.set_completed("a", true).unwrap();
        graph.set_in_progress("b", true).unwrap();

        let ready = ready_work(&graph, &EngineConfig::default()).into_value();
        assert_eq!(ready, vec!["c"]);
    }

    #[test]
    fn test_in_progress_dependency_still_blocks() {
        let mut graph = make_graph(&[("a", 0), ("b", 0)], &[("a", "b")]);
        graph.set_in_progress("a", true).unwrap();

        assert!(ready_work(&graph, &EngineConfig::default())
            .into_value()
            .is_empty());
    }

    #[test]
    fn test_absent_dependency_is_satisfied() {
        let mut graph = make_graph(&[("a", 0), ("b", 0)], &[("a", "b")]);
        graph.nodes.remove("a");

        let ready = ready_work(&graph, &EngineConfig::default()).into_value();
        assert_eq!(ready, vec!["b"]);
    }

    #[test]
    fn test_missing_edge_degrades_to_empty() {
        let mut graph = make_graph(&[("a", 0)], &[]);
        graph
            .nodes
            .get_mut("a")
            .unwrap()
            .dependencies_in
            .insert("phantom".to_string());

        let ready = ready_work(&graph, &EngineConfig::default());
        assert!(ready.is_degraded());
        assert_eq!(ready.reason(), Some("Edge not found: phantom"));
        assert!(ready.value().is_empty());
    }
}
