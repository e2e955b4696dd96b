//! Structural consistency checks over a `DependencyGraph`.

use rustc_hash::FxHashMap;

use crate::graph::DependencyGraph;
use crate::models::ValidationReport;

/// Run every structural check and report all violations found.
///
/// Categories are independent; an empty category means its invariant holds.
/// Never mutates the graph.
pub fn validate_graph(graph: &DependencyGraph) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (edge_id, edge) in &graph.edges {
        for (role, endpoint) in [("source", &edge.source_id), ("target", &edge.target_id)] {
            if !graph.contains(endpoint) {
                report.missing_nodes.push(format!(
                    "Edge {} references missing {} node {}",
                    edge_id, role, endpoint
                ));
            }
        }
        if edge.source_id == edge.target_id {
            report.self_loops.push(format!(
                "Edge {} makes node {} depend on itself",
                edge_id, edge.source_id
            ));
        }
    }

    for (node_id, node) in &graph.nodes {
        for (direction, edge_ids) in [
            ("incoming", &node.dependencies_in),
            ("outgoing", &node.dependencies_out),
        ] {
            for edge_id in edge_ids {
                if !graph.edges.contains_key(edge_id) {
                    report.missing_edges.push(format!(
                        "Node {} lists missing {} edge {}",
                        node_id, direction, edge_id
                    ));
                }
            }
        }
    }

    let mut recomputed: FxHashMap<&str, usize> = FxHashMap::default();
    for (node_id, successors) in &graph.adjacency_list {
        if !graph.contains(node_id) {
            report
                .invalid_adjacency
                .push(format!("Adjacency key {} is not a node", node_id));
        }
        for successor in successors {
            if !graph.contains(successor) {
                report.invalid_adjacency.push(format!(
                    "Adjacency entry {} -> {} references missing node",
                    node_id, successor
                ));
            }
            *recomputed.entry(successor.as_str()).or_insert(0) += 1;
        }
    }

    for node_id in graph.nodes.keys() {
        let expected = recomputed.get(node_id.as_str()).copied().unwrap_or(0);
        match graph.in_degree.get(node_id) {
            Some(&recorded) if recorded == expected => {}
            Some(&recorded) => report.degree_mismatches.push(format!(
                "Node {} has in-degree {} but {} adjacency entries point to it",
                node_id, recorded, expected
            )),
            None => report.degree_mismatches.push(format!(
                "Node {} has no in-degree recorded, expected {}",
                node_id, expected
            )),
        }
    }

    report
}
