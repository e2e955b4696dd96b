//! Core data types for the dependency engine.

use pyo3::prelude::*;
use std::collections::BTreeSet;

/// A unit of schedulable work.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct DependencyNode {
    #[pyo3(get)]
    pub id: String,
    /// Higher = more urgent.
    #[pyo3(get, set)]
    pub priority: i32,
    /// `None` means "use the engine's default duration".
    #[pyo3(get, set)]
    pub estimated_duration: Option<f64>,
    #[pyo3(get, set)]
    pub is_completed: bool,
    #[pyo3(get, set)]
    pub is_in_progress: bool,
    /// Edge IDs where this node is the target, ordered so traversals are
    /// repeatable.
    #[pyo3(get)]
    pub dependencies_in: BTreeSet<String>,
    /// Edge IDs where this node is the source.
    #[pyo3(get)]
    pub dependencies_out: BTreeSet<String>,
}

impl DependencyNode {
    pub fn new(id: impl Into<String>, priority: i32) -> Self {
        Self {
            id: id.into(),
            priority,
            estimated_duration: None,
            is_completed: false,
            is_in_progress: false,
            dependencies_in: BTreeSet::new(),
            dependencies_out: BTreeSet::new(),
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.estimated_duration = Some(duration);
        self
    }

    /// Neither finished nor claimed by a worker.
    #[inline]
    pub fn is_pending(&self) -> bool {
        !self.is_completed && !self.is_in_progress
    }
}

#[pymethods]
impl DependencyNode {
    #[new]
    #[pyo3(signature = (id, priority=0, estimated_duration=None, is_completed=false, is_in_progress=false))]
    fn py_new(
        id: String,
        priority: i32,
        estimated_duration: Option<f64>,
        is_completed: bool,
        is_in_progress: bool,
    ) -> Self {
        Self {
            estimated_duration,
            is_completed,
            is_in_progress,
            ..Self::new(id, priority)
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "DependencyNode(id={:?}, priority={}, duration={:?}, completed={}, in_progress={})",
            self.id, self.priority, self.estimated_duration, self.is_completed, self.is_in_progress
        )
    }
}

/// Directed "target depends on source" relationship.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyEdge {
    #[pyo3(get)]
    pub id: String,
    /// Must complete before `target_id` starts.
    #[pyo3(get)]
    pub source_id: String,
    #[pyo3(get)]
    pub target_id: String,
}

impl DependencyEdge {
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
        }
    }
}

#[pymethods]
impl DependencyEdge {
    #[new]
    fn py_new(id: String, source_id: String, target_id: String) -> Self {
        Self::new(id, source_id, target_id)
    }

    fn __repr__(&self) -> String {
        format!(
            "DependencyEdge(id={:?}, {} -> {})",
            self.id, self.source_id, self.target_id
        )
    }
}

/// Result of a whole-graph topological sort.
///
/// A non-empty `cycles` means `sorted_nodes` is only a partial order.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TopologicalSort {
    #[pyo3(get)]
    pub sorted_nodes: Vec<String>,
    #[pyo3(get)]
    pub cycles: Vec<Vec<String>>,
    /// BFS layers of Kahn's algorithm.
    #[pyo3(get)]
    pub levels: Vec<Vec<String>>,
    #[pyo3(get)]
    pub critical_path: Vec<String>,
    #[pyo3(get)]
    pub parallel_groups: Vec<Vec<String>>,
    #[pyo3(get)]
    pub algorithm_used: String,
}

#[pymethods]
impl TopologicalSort {
    /// True when every node was ordered.
    pub fn is_complete(&self) -> bool {
        self.cycles.is_empty()
    }

    fn __repr__(&self) -> String {
        format!(
            "TopologicalSort(sorted={}, levels={}, cycles={}, algorithm={:?})",
            self.sorted_nodes.len(),
            self.levels.len(),
            self.cycles.len(),
            self.algorithm_used
        )
    }
}

/// Structural issues found by the consistency validator, by category.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Edges whose source or target node does not exist.
    #[pyo3(get)]
    pub missing_nodes: Vec<String>,
    /// Node `dependencies_in`/`dependencies_out` entries naming absent edges.
    #[pyo3(get)]
    pub missing_edges: Vec<String>,
    /// Adjacency keys or successors that are not nodes.
    #[pyo3(get)]
    pub invalid_adjacency: Vec<String>,
    /// Recorded in-degree disagreeing with the adjacency list.
    #[pyo3(get)]
    pub degree_mismatches: Vec<String>,
    #[pyo3(get)]
    pub self_loops: Vec<String>,
}

#[pymethods]
impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issue_count() == 0
    }

    pub fn issue_count(&self) -> usize {
        self.missing_nodes.len()
            + self.missing_edges.len()
            + self.invalid_adjacency.len()
            + self.degree_mismatches.len()
            + self.self_loops.len()
    }

    fn __repr__(&self) -> String {
        format!("ValidationReport(issues={})", self.issue_count())
    }
}

/// Outcome of an advisory planning call.
///
/// Advisory operations never fail: when something goes wrong internally they
/// hand back their documented fallback together with the reason, so callers
/// in a live loop keep running while the degradation stays observable.
#[derive(Clone, Debug, PartialEq)]
pub enum Advisory<T> {
    Complete(T),
    Degraded { fallback: T, reason: String },
}

impl<T> Advisory<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Complete(value) => value,
            Self::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Complete(value) => value,
            Self::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Complete(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }

    /// Wrap `result`, substituting `fallback` and emitting a warning on error.
    pub(crate) fn from_result<E: std::fmt::Display>(
        operation: &str,
        result: Result<T, E>,
        fallback: impl FnOnce() -> T,
    ) -> Self {
        match result {
            Ok(value) => Self::Complete(value),
            Err(err) => {
                tracing::warn!(operation, error = %err, "advisory result degraded");
                Self::Degraded {
                    fallback: fallback(),
                    reason: err.to_string(),
                }
            }
        }
    }
}
