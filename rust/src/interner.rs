//! Dense integer indices for node IDs.
//!
//! Traversals that keep per-node state (DFS colors) index a `Vec` instead of
//! hashing strings on every edge.

use rustc_hash::FxHashMap;

use crate::graph::DependencyGraph;

/// Interned node ID (u32 for compact storage).
pub type NodeIdx = u32;

/// Maps node ID strings to dense indices `0..len()`.
#[derive(Debug, Clone, Default)]
pub struct NodeInterner {
    to_idx: FxHashMap<String, NodeIdx>,
}

impl NodeInterner {
    /// Pre-intern every node of `graph` in its deterministic key order.
    pub fn from_graph(graph: &DependencyGraph) -> Self {
        let mut interner = Self {
            to_idx: FxHashMap::with_capacity_and_hasher(graph.len(), Default::default()),
        };
        for id in graph.nodes.keys() {
            interner.intern(id);
        }
        interner
    }

    /// Index for `id`, allocating a new one for IDs not seen before
    /// (e.g. successors that dangle outside the node map).
    pub fn intern(&mut self, id: &str) -> NodeIdx {
        if let Some(&idx) = self.to_idx.get(id) {
            return idx;
        }
        let idx = self.to_idx.len() as NodeIdx;
        self.to_idx.insert(id.to_string(), idx);
        idx
    }

    pub fn len(&self) -> usize {
        self.to_idx.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DependencyNode;

    #[test]
    fn test_from_graph_uses_key_order() {
        let mut graph = DependencyGraph::new();
        graph.add_node(DependencyNode::new("b", 0)).unwrap();
        graph.add_node(DependencyNode::new("a", 0)).unwrap();

        let mut interner = NodeInterner::from_graph(&graph);
        assert_eq!(interner.len(), 2);
        assert_eq!(interner.intern("a"), 0);
        assert_eq!(interner.intern("b"), 1);
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_intern_unknown_id_extends_index() {
        let mut interner = NodeInterner::default();
        assert_eq!(interner.len(), 0);

        let first = interner.intern("ghost");
        let again = interner.intern("ghost");
        assert_eq!(first, again);
        assert_eq!(interner.len(), 1);
        assert_eq!(interner.intern("other"), 1);
    }
}
