//! Longest-path work levels.
//!
//! A node's level is 1 + the highest level among its dependencies (0 for
//! none). This differs from the BFS layers of the topological sort: a node
//! reachable by both a short and a long chain lands after the long one here.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::graph::{DependencyGraph, GraphError};
use crate::log_debug;
use crate::models::Advisory;

/// Group every node by longest-path level, node IDs in key order per level.
///
/// Nodes reached again while still on the recursion path (a cycle) count as
/// level 0 at that point instead of recursing forever.
pub fn work_levels(
    graph: &DependencyGraph,
    config: &EngineConfig,
) -> Advisory<BTreeMap<usize, Vec<String>>> {
    Advisory::from_result("work_levels", compute_levels(graph, config), BTreeMap::new)
}

struct LevelMemo<'g> {
    graph: &'g DependencyGraph,
    levels: FxHashMap<&'g str, usize>,
    on_path: FxHashSet<&'g str>,
}

impl<'g> LevelMemo<'g> {
    fn level_of(&mut self, node_id: &'g str) -> Result<usize, GraphError> {
        if let Some(&level) = self.levels.get(node_id) {
            return Ok(level);
        }
        if self.on_path.contains(node_id) {
            return Ok(0);
        }

        self.on_path.insert(node_id);
        let graph = self.graph;
        let mut level = 0;
        for dep in graph.dependencies(node_id)? {
            if !graph.contains(dep) {
                continue;
            }
            level = level.max(self.level_of(dep)? + 1);
        }
        self.on_path.remove(node_id);
        self.levels.insert(node_id, level);
        Ok(level)
    }
}

pub(super) fn compute_levels(
    graph: &DependencyGraph,
    config: &EngineConfig,
) -> Result<BTreeMap<usize, Vec<String>>, GraphError> {
    let mut memo = LevelMemo {
        graph,
        levels: FxHashMap::with_capacity_and_hasher(graph.len(), Default::default()),
        on_path: FxHashSet::default(),
    };

    let mut grouped: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for node_id in graph.nodes.keys() {
        let level = memo.level_of(node_id)?;
        log_debug!(config.verbosity, "  {} at level {}", node_id, level);
        grouped.entry(level).or_default().push(node_id.clone());
    }
    Ok(grouped)
}
