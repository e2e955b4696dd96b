//! In-memory dependency graph: nodes, edges, adjacency and in-degree.

use pyo3::exceptions::{PyKeyError, PyValueError};
use pyo3::prelude::*;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::{DependencyEdge, DependencyNode, TopologicalSort};

/// Structural problems with the graph, either rejected at mutation time or
/// discovered mid-algorithm.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),
    #[error("Edge not found: {0}")]
    EdgeNotFound(String),
    #[error("Duplicate node: {0}")]
    DuplicateNode(String),
    #[error("Duplicate edge: {0}")]
    DuplicateEdge(String),
    #[error("Edge {edge_id} makes node {node_id} depend on itself")]
    SelfDependency { edge_id: String, node_id: String },
    #[error("Adjacency entry {from} -> {to} references an unknown node")]
    DanglingSuccessor { from: String, to: String },
    #[error("No in-degree recorded for node {0}")]
    MissingInDegree(String),
    #[error("In-degree of node {0} dropped below zero")]
    DegreeUnderflow(String),
    #[error("Node {node} records in-degree {recorded} but {actual} adjacency entries point to it")]
    InDegreeMismatch {
        node: String,
        recorded: usize,
        actual: usize,
    },
}

/// The aggregate every engine operation reads.
///
/// Fields are public so an upstream builder can assemble the maps directly;
/// the `add_*`/`remove_*` methods keep the cross-map invariants intact and
/// `validation::validate_graph` checks them for graphs built any other way.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    pub nodes: BTreeMap<String, DependencyNode>,
    pub edges: BTreeMap<String, DependencyEdge>,
    /// node id -> successor ids (targets of edges leaving the node)
    pub adjacency_list: BTreeMap<String, Vec<String>>,
    /// node id -> number of incoming edges
    pub in_degree: BTreeMap<String, usize>,
    /// Result of the most recent `sort_and_cache`, cleared on structural change.
    pub last_sort: Option<TopologicalSort>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    #[inline]
    pub fn node(&self, node_id: &str) -> Option<&DependencyNode> {
        self.nodes.get(node_id)
    }

    /// Successors of `node_id` in adjacency order (empty for unknown IDs).
    #[inline]
    pub fn successors(&self, node_id: &str) -> &[String] {
        self.adjacency_list
            .get(node_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// IDs this node depends on: sources of its incoming edges.
    ///
    /// Sources need not exist as nodes; callers decide how to treat them.
    pub fn dependencies(&self, node_id: &str) -> Result<Vec<&str>, GraphError> {
        let node = self
            .nodes
            .get(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
        node.dependencies_in
            .iter()
            .map(|edge_id| {
                self.edges
                    .get(edge_id)
                    .map(|edge| edge.source_id.as_str())
                    .ok_or_else(|| GraphError::EdgeNotFound(edge_id.clone()))
            })
            .collect()
    }

    /// IDs that depend on this node: targets of its outgoing edges.
    pub fn dependents(&self, node_id: &str) -> Result<Vec<&str>, GraphError> {
        let node = self
            .nodes
            .get(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
        node.dependencies_out
            .iter()
            .map(|edge_id| {
                self.edges
                    .get(edge_id)
                    .map(|edge| edge.target_id.as_str())
                    .ok_or_else(|| GraphError::EdgeNotFound(edge_id.clone()))
            })
            .collect()
    }

    /// Nodes with no incoming edges.
    pub fn roots(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.dependencies_in.is_empty())
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Nodes nothing depends on.
    pub fn leaves(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.dependencies_out.is_empty())
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn add_node(&mut self, mut node: DependencyNode) -> Result<(), GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        // Edge membership is owned by the graph, not the caller.
        node.dependencies_in.clear();
        node.dependencies_out.clear();

        self.adjacency_list.insert(node.id.clone(), Vec::new());
        self.in_degree.insert(node.id.clone(), 0);
        self.nodes.insert(node.id.clone(), node);
        self.last_sort = None;
        Ok(())
    }

    pub fn add_edge(&mut self, edge: DependencyEdge) -> Result<(), GraphError> {
        if self.edges.contains_key(&edge.id) {
            return Err(GraphError::DuplicateEdge(edge.id));
        }
        if edge.source_id == edge.target_id {
            return Err(GraphError::SelfDependency {
                edge_id: edge.id,
                node_id: edge.source_id,
            });
        }
        for endpoint in [&edge.source_id, &edge.target_id] {
            if !self.nodes.contains_key(endpoint) {
                return Err(GraphError::NodeNotFound(endpoint.clone()));
            }
        }

        if let Some(source) = self.nodes.get_mut(&edge.source_id) {
            source.dependencies_out.insert(edge.id.clone());
        }
        if let Some(target) = self.nodes.get_mut(&edge.target_id) {
            target.dependencies_in.insert(edge.id.clone());
        }
        self.adjacency_list
            .entry(edge.source_id.clone())
            .or_default()
            .push(edge.target_id.clone());
        *self.in_degree.entry(edge.target_id.clone()).or_insert(0) += 1;

        self.edges.insert(edge.id.clone(), edge);
        self.last_sort = None;
        Ok(())
    }

    /// Convenience for `add_edge(DependencyEdge::new(..))`.
    pub fn connect(
        &mut self,
        edge_id: &str,
        source_id: &str,
        target_id: &str,
    ) -> Result<(), GraphError> {
        self.add_edge(DependencyEdge::new(edge_id, source_id, target_id))
    }

    pub fn remove_edge(&mut self, edge_id: &str) -> Result<DependencyEdge, GraphError> {
        let edge = self
            .edges
            .remove(edge_id)
            .ok_or_else(|| GraphError::EdgeNotFound(edge_id.to_string()))?;

        if let Some(source) = self.nodes.get_mut(&edge.source_id) {
            source.dependencies_out.remove(edge_id);
        }
        if let Some(target) = self.nodes.get_mut(&edge.target_id) {
            target.dependencies_in.remove(edge_id);
        }
        // Parallel edges share a successor entry per edge; drop exactly one.
        if let Some(successors) = self.adjacency_list.get_mut(&edge.source_id) {
            if let Some(pos) = successors.iter().position(|s| *s == edge.target_id) {
                successors.remove(pos);
            }
        }
        if let Some(degree) = self.in_degree.get_mut(&edge.target_id) {
            *degree = degree.saturating_sub(1);
        }

        self.last_sort = None;
        Ok(edge)
    }

    /// Remove a node together with every edge touching it.
    pub fn remove_node(&mut self, node_id: &str) -> Result<DependencyNode, GraphError> {
        let incident: Vec<String> = {
            let node = self
                .nodes
                .get(node_id)
                .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
            node.dependencies_in
                .iter()
                .chain(node.dependencies_out.iter())
                .cloned()
                .collect()
        };
        for edge_id in incident {
            // An edge listed on the node but already gone is not fatal here.
            let _ = self.remove_edge(&edge_id);
        }

        self.adjacency_list.remove(node_id);
        self.in_degree.remove(node_id);
        self.last_sort = None;
        self.nodes
            .remove(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))
    }

    pub fn set_completed(&mut self, node_id: &str, completed: bool) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
        node.is_completed = completed;
        Ok(())
    }

    pub fn set_in_progress(&mut self, node_id: &str, in_progress: bool) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
        node.is_in_progress = in_progress;
        Ok(())
    }
}

impl From<GraphError> for PyErr {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NodeNotFound(_) | GraphError::EdgeNotFound(_) => {
                PyKeyError::new_err(err.to_string())
            }
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

#[pymethods]
impl DependencyGraph {
    #[new]
    fn py_new() -> Self {
        Self::new()
    }

    #[pyo3(name = "add_node")]
    fn py_add_node(&mut self, node: DependencyNode) -> PyResult<()> {
        Ok(self.add_node(node)?)
    }

    #[pyo3(name = "add_edge")]
    fn py_add_edge(&mut self, edge: DependencyEdge) -> PyResult<()> {
        Ok(self.add_edge(edge)?)
    }

    #[pyo3(name = "remove_edge")]
    fn py_remove_edge(&mut self, edge_id: &str) -> PyResult<DependencyEdge> {
        Ok(self.remove_edge(edge_id)?)
    }

    #[pyo3(name = "remove_node")]
    fn py_remove_node(&mut self, node_id: &str) -> PyResult<DependencyNode> {
        Ok(self.remove_node(node_id)?)
    }

    #[pyo3(name = "set_completed")]
    fn py_set_completed(&mut self, node_id: &str, completed: bool) -> PyResult<()> {
        Ok(self.set_completed(node_id, completed)?)
    }

    #[pyo3(name = "set_in_progress")]
    fn py_set_in_progress(&mut self, node_id: &str, in_progress: bool) -> PyResult<()> {
        Ok(self.set_in_progress(node_id, in_progress)?)
    }

    #[pyo3(name = "get_node")]
    fn py_get_node(&self, node_id: &str) -> Option<DependencyNode> {
        self.node(node_id).cloned()
    }

    fn node_ids(&self) -> Vec<String> {
        self.nodes.keys().cloned().collect()
    }

    #[getter(last_sort)]
    fn py_last_sort(&self) -> Option<TopologicalSort> {
        self.last_sort.clone()
    }

    fn __len__(&self) -> usize {
        self.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "DependencyGraph(nodes={}, edges={})",
            self.nodes.len(),
            self.edges.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_graph(nodes: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for id in nodes {
            graph.add_node(DependencyNode::new(*id, 0)).unwrap();
        }
        for (i, (source, target)) in edges.iter().enumerate() {
            graph.connect(&format!("e{}", i), source, target).unwrap();
        }
        graph
    }

    #[test]
    fn test_add_edge_updates_every_map() {
        let graph = make_graph(&["a", "b"], &[("a", "b")]);

        assert_eq!(graph.successors("a"), &["b".to_string()]);
        assert!(graph.successors("b").is_empty());
        assert_eq!(graph.in_degree.get("a"), Some(&0));
        assert_eq!(graph.in_degree.get("b"), Some(&1));
        assert!(graph.nodes["a"].dependencies_out.contains("e0"));
        assert!(graph.nodes["b"].dependencies_in.contains("e0"));
    }

    #[test]
    fn test_dependency_lookup_both_directions() {
        let graph = make_graph(&["a", "b", "c"], &[("a", "c"), ("b", "c")]);

        let mut deps = graph.dependencies("c").unwrap();
        deps.sort();
        assert_eq!(deps, vec!["a", "b"]);
        assert_eq!(graph.dependents("a").unwrap(), vec!["c"]);
        assert!(graph.dependencies("a").unwrap().is_empty());
        assert_eq!(
            graph.dependencies("zzz"),
            Err(GraphError::NodeNotFound("zzz".to_string()))
        );
    }

    #[test]
    fn test_dependency_lookup_reports_missing_edge() {
        let mut graph = make_graph(&["a", "b"], &[("a", "b")]);
        graph.edges.remove("e0");

        assert_eq!(
            graph.dependencies("b"),
            Err(GraphError::EdgeNotFound("e0".to_string()))
        );
    }

    #[test]
    fn test_rejects_bad_edges() {
        let mut graph = make_graph(&["a", "b"], &[("a", "b")]);

        assert_eq!(
            graph.connect("e0", "b", "a"),
            Err(GraphError::DuplicateEdge("e0".to_string()))
        );
        assert_eq!(
            graph.connect("loop", "a", "a"),
            Err(GraphError::SelfDependency {
                edge_id: "loop".to_string(),
                node_id: "a".to_string()
            })
        );
        assert_eq!(
            graph.connect("e9", "a", "ghost"),
            Err(GraphError::NodeNotFound("ghost".to_string()))
        );
        assert_eq!(
            graph.add_node(DependencyNode::new("a", 1)),
            Err(GraphError::DuplicateNode("a".to_string()))
        );
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut graph = make_graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);

        let removed = graph.remove_node("b").unwrap();
        assert_eq!(removed.id, "b");
        assert!(graph.edges.is_empty());
        assert!(graph.successors("a").is_empty());
        assert_eq!(graph.in_degree.get("c"), Some(&0));
        assert!(graph.nodes["a"].dependencies_out.is_empty());
        assert!(graph.nodes["c"].dependencies_in.is_empty());
        assert!(!graph.adjacency_list.contains_key("b"));
    }

    #[test]
    fn test_remove_parallel_edge_keeps_the_other() {
        let mut graph = make_graph(&["a", "b"], &[("a", "b"), ("a", "b")]);
        assert_eq!(graph.in_degree.get("b"), Some(&2));

        graph.remove_edge("e0").unwrap();
        assert_eq!(graph.successors("a"), &["b".to_string()]);
        assert_eq!(graph.in_degree.get("b"), Some(&1));
    }

    #[test]
    fn test_roots_and_leaves() {
        let graph = make_graph(&["a", "b", "c", "d"], &[("a", "b"), ("a", "c")]);

        assert_eq!(graph.roots(), vec!["a", "d"]);
        assert_eq!(graph.leaves(), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_structural_change_clears_cached_sort() {
        let mut graph = make_graph(&["a", "b"], &[]);
        graph.last_sort = Some(TopologicalSort::default());

        graph.connect("e0", "a", "b").unwrap();
        assert!(graph.last_sort.is_none());
    }

    #[test]
    fn test_status_flags() {
        let mut graph = make_graph(&["a"], &[]);
        graph.set_completed("a", true).unwrap();
        graph.set_in_progress("a", true).unwrap();

        assert!(graph.nodes["a"].is_completed);
        assert!(graph.nodes["a"].is_in_progress);
        assert!(graph.set_completed("ghost", true).is_err());
    }
}
