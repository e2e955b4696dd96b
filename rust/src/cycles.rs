//! Cycle detection by three-color depth-first search.
//!
//! White = unvisited, gray = on the current DFS path, black = finished.
//! Reaching a gray node means a back edge; the cycle is the slice of the
//! current path starting at that node, closed by repeating it.

use rustc_hash::FxHashSet;

use crate::graph::DependencyGraph;
use crate::interner::NodeInterner;

/// A detected cycle: node IDs along the loop, first ID repeated at the end.
pub type Cycle = Vec<String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

struct CycleSearch<'g> {
    graph: &'g DependencyGraph,
    /// Only edges whose target is in here are followed, when set.
    subset: Option<FxHashSet<&'g str>>,
    interner: NodeInterner,
    colors: Vec<Color>,
    path: Vec<&'g str>,
    cycles: Vec<Cycle>,
}

impl<'g> CycleSearch<'g> {
    fn new(graph: &'g DependencyGraph, subset: Option<FxHashSet<&'g str>>) -> Self {
        let interner = NodeInterner::from_graph(graph);
        let colors = vec![Color::White; interner.len()];
        Self {
            graph,
            subset,
            interner,
            colors,
            path: Vec::new(),
            cycles: Vec::new(),
        }
    }

    fn color(&mut self, id: &str) -> Color {
        let idx = self.interner.intern(id) as usize;
        if idx >= self.colors.len() {
            self.colors.resize(idx + 1, Color::White);
        }
        self.colors[idx]
    }

    fn paint(&mut self, id: &str, color: Color) {
        let idx = self.interner.intern(id) as usize;
        if idx >= self.colors.len() {
            self.colors.resize(idx + 1, Color::White);
        }
        self.colors[idx] = color;
    }

    fn follows(&self, target: &str) -> bool {
        self.subset
            .as_ref()
            .map_or(true, |subset| subset.contains(target))
    }

    /// Depth-first walk from `start` on an explicit frame stack.
    ///
    /// Each frame holds a node on the current path and the index of the next
    /// successor to examine; `self.path` mirrors the frame stack.
    fn visit(&mut self, start: &'g str) {
        let graph = self.graph;
        let mut frames: Vec<(&'g str, usize)> = vec![(start, 0)];
        self.paint(start, Color::Gray);
        self.path.push(start);

        while let Some(frame) = frames.last_mut() {
            let (node_id, cursor) = *frame;
            let successors = graph.successors(node_id);
            let Some(next) = successors.get(cursor) else {
                frames.pop();
                self.path.pop();
                self.paint(node_id, Color::Black);
                continue;
            };
            frame.1 += 1;

            if !self.follows(next) {
                continue;
            }
            match self.color(next) {
                Color::White => {
                    self.paint(next, Color::Gray);
                    self.path.push(next.as_str());
                    frames.push((next.as_str(), 0));
                }
                Color::Gray => self.record_back_edge(next),
                Color::Black => {}
            }
        }
    }

    fn record_back_edge(&mut self, repeated: &str) {
        let cycle = match self.path.iter().position(|id| *id == repeated) {
            Some(start) => {
                let mut cycle: Cycle = self.path[start..].iter().map(|id| id.to_string()).collect();
                cycle.push(repeated.to_string());
                cycle
            }
            // Gray but off the live path; keep a minimal marker rather than fail.
            None => vec![repeated.to_string()],
        };
        self.cycles.push(cycle);
    }

    fn run(mut self, starts: impl IntoIterator<Item = &'g str>) -> Vec<Cycle> {
        for start in starts {
            if self.color(start) == Color::White {
                self.visit(start);
            }
        }
        self.cycles
    }
}

/// Find every cycle in the graph, restarting the DFS from each node still
/// white so disjoint cycles are all reported.
pub fn detect_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    CycleSearch::new(graph, None).run(graph.nodes.keys().map(String::as_str))
}

/// Find cycles among `node_ids`, following only edges that stay inside the
/// subset. Used to diagnose the part of the graph a sort could not order.
pub fn detect_cycles_in_subset<'g>(graph: &'g DependencyGraph, node_ids: &'g [String]) -> Vec<Cycle> {
    let subset: FxHashSet<&str> = node_ids.iter().map(String::as_str).collect();
    CycleSearch::new(graph, Some(subset)).run(node_ids.iter().map(String::as_str))
}
