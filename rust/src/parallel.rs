//! Split sort levels into groups that are safe to run concurrently.
//!
//! Kahn levels are BFS layers, so two nodes of one level can still share a
//! direct edge. Each level is greedily partitioned into groups with no edge
//! between any two members, preferring fewer, larger groups.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::{DependencyGraph, GraphError};

/// Refine `levels` into independent groups, preserving level order.
///
/// Single-node levels pass through unchanged. Group order within a level is
/// not part of the contract.
pub fn parallel_groups(
    graph: &DependencyGraph,
    levels: &[Vec<String>],
) -> Result<Vec<Vec<String>>, GraphError> {
    let mut groups = Vec::with_capacity(levels.len());

    for level in levels {
        match level.len() {
            0 => continue,
            1 => {
                groups.push(level.clone());
                continue;
            }
            _ => {}
        }

        let linked = direct_links(graph, level)?;
        let is_linked = |a: &str, b: &str| {
            linked.get(a).is_some_and(|deps| deps.contains(b))
                || linked.get(b).is_some_and(|deps| deps.contains(a))
        };

        let mut remaining: Vec<&str> = level.iter().map(String::as_str).collect();
        while !remaining.is_empty() {
            let mut group: Vec<&str> = Vec::new();
            let mut deferred: Vec<&str> = Vec::new();
            for candidate in remaining {
                if group.iter().all(|member| !is_linked(candidate, *member)) {
                    group.push(candidate);
                } else {
                    deferred.push(candidate);
                }
            }
            groups.push(group.into_iter().map(str::to_string).collect());
            remaining = deferred;
        }
    }

    Ok(groups)
}

/// node -> its direct dependencies, restricted to this level's members
fn direct_links<'g>(
    graph: &'g DependencyGraph,
    level: &[String],
) -> Result<FxHashMap<&'g str, FxHashSet<&'g str>>, GraphError> {
    let members: FxHashSet<&str> = level.iter().map(String::as_str).collect();
    let mut links = FxHashMap::default();
    for node_id in level {
        let (key, _) = graph
            .nodes
            .get_key_value(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.clone()))?;
        let deps: FxHashSet<&str> = graph
            .dependencies(node_id)?
            .into_iter()
            .filter(|dep| members.contains(dep))
            .collect();
        links.insert(key.as_str(), deps);
    }
    Ok(links)
}
