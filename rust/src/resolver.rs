//! Dependency closure of a single node.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::graph::{DependencyGraph, GraphError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Node not found: {0}")]
    NotFound(String),
    /// Carries the loop, first node repeated at the end.
    #[error("Circular dependency detected: {}", .0.join(" -> "))]
    CircularDependency(Vec<String>),
    #[error("Dependency resolution failed: {0}")]
    ResolutionFailed(#[from] GraphError),
}

struct Resolver<'g> {
    graph: &'g DependencyGraph,
    visited: FxHashSet<&'g str>,
    temp_visited: FxHashSet<&'g str>,
    stack: Vec<&'g str>,
    order: Vec<String>,
}

impl<'g> Resolver<'g> {
    fn visit(&mut self, node_id: &'g str) -> Result<(), ResolveError> {
        if self.visited.contains(node_id) {
            return Ok(());
        }
        if self.temp_visited.contains(node_id) {
            let start = self
                .stack
                .iter()
                .position(|id| *id == node_id)
                .unwrap_or(0);
            let mut cycle: Vec<String> = self.stack[start..].iter().map(|id| id.to_string()).collect();
            cycle.push(node_id.to_string());
            return Err(ResolveError::CircularDependency(cycle));
        }

        self.temp_visited.insert(node_id);
        self.stack.push(node_id);

        let graph = self.graph;
        for dep in graph.dependencies(node_id)? {
            // Unknown dependencies are treated as satisfied externally.
            if !graph.contains(dep) {
                continue;
            }
            self.visit(dep)?;
        }

        self.stack.pop();
        self.temp_visited.remove(node_id);
        self.visited.insert(node_id);
        self.order.push(node_id.to_string());
        Ok(())
    }
}

/// Everything that must run before `node_id`, in a valid order, ending with
/// `node_id` itself.
///
/// # Returns
/// * `Err(ResolveError::NotFound)` if `node_id` is not in the graph
/// * `Err(ResolveError::CircularDependency)` if the closure contains a cycle
/// * `Err(ResolveError::ResolutionFailed)` if a node lists a missing edge
pub fn resolve_dependencies(
    graph: &DependencyGraph,
    node_id: &str,
) -> Result<Vec<String>, ResolveError> {
    let (key, _) = graph
        .nodes
        .get_key_value(node_id)
        .ok_or_else(|| ResolveError::NotFound(node_id.to_string()))?;

    let mut resolver = Resolver {
        graph,
        visited: FxHashSet::default(),
        temp_visited: FxHashSet::default(),
        stack: Vec::new(),
        order: Vec::new(),
    };
    resolver.visit(key)?;
    Ok(resolver.order)
}
