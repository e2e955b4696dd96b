//! Dependency graph resolution and scheduling engine.
//!
//! Takes a graph of work items with "depends-on" edges and produces
//! scheduling artifacts: a topological order with BFS levels, cycle
//! diagnostics, the critical path, parallel groups, single-node dependency
//! closures, ready work, and a load-balanced assignment across agents.
//! Everything is in-memory and synchronous; the only mutation the engine
//! performs is `sort_and_cache` writing `DependencyGraph::last_sort`.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::collections::BTreeMap;

mod config;
pub mod critical_path;
pub mod cycles;
pub mod graph;
mod interner;
pub mod logging;
mod models;
pub mod parallel;
pub mod resolver;
pub mod scheduler;
pub mod topological;
pub mod validation;

pub use config::EngineConfig;
pub use critical_path::{calculate_critical_path, CriticalPathAnalysis, NodeTiming};
pub use cycles::{detect_cycles, detect_cycles_in_subset, Cycle};
pub use graph::{DependencyGraph, GraphError};
pub use models::{Advisory, DependencyEdge, DependencyNode, TopologicalSort, ValidationReport};
pub use parallel::parallel_groups;
pub use resolver::{resolve_dependencies, ResolveError};
pub use scheduler::{assign_work, ready_work, work_levels, AssignmentError};
pub use topological::{sort_and_cache, topological_sort, SortError, ALGORITHM_KAHN};
pub use validation::validate_graph;

impl From<SortError> for PyErr {
    fn from(err: SortError) -> Self {
        PyRuntimeError::new_err(err.to_string())
    }
}

impl From<ResolveError> for PyErr {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound(_) => PyKeyError::new_err(err.to_string()),
            ResolveError::CircularDependency(_) => PyValueError::new_err(err.to_string()),
            ResolveError::ResolutionFailed(_) => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

/// Sort the graph with Kahn's algorithm and cache the result on it.
///
/// Cycles do not raise: check `TopologicalSort.cycles` before trusting the
/// order as complete.
///
/// # Raises
/// * RuntimeError if the graph's adjacency or in-degree maps are malformed
#[pyfunction]
#[pyo3(name = "sort", signature = (graph, config=None))]
fn py_sort(
    mut graph: PyRefMut<'_, DependencyGraph>,
    config: Option<EngineConfig>,
) -> PyResult<TopologicalSort> {
    let config = config.unwrap_or_default();
    Ok(sort_and_cache(&mut graph, &config)?.clone())
}

/// Find every cycle in the graph.
#[pyfunction]
#[pyo3(name = "detect_cycles")]
fn py_detect_cycles(graph: PyRef<'_, DependencyGraph>) -> Vec<Vec<String>> {
    detect_cycles(&graph)
}

/// Find cycles among `node_ids`, following only edges inside that subset.
#[pyfunction]
#[pyo3(name = "detect_cycles_in_subset")]
fn py_detect_cycles_in_subset(
    graph: PyRef<'_, DependencyGraph>,
    node_ids: Vec<String>,
) -> Vec<Vec<String>> {
    detect_cycles_in_subset(&graph, &node_ids)
}

/// Zero-slack nodes for an already-sorted node sequence.
///
/// # Raises
/// * KeyError if a sorted node or a listed edge does not exist
#[pyfunction]
#[pyo3(name = "critical_path", signature = (graph, sorted_nodes, config=None))]
fn py_critical_path(
    graph: PyRef<'_, DependencyGraph>,
    sorted_nodes: Vec<String>,
    config: Option<EngineConfig>,
) -> PyResult<Vec<String>> {
    let config = config.unwrap_or_default();
    Ok(calculate_critical_path(&graph, &sorted_nodes, &config)?.critical_path)
}

/// Split levels into groups with no direct edge between members.
#[pyfunction]
#[pyo3(name = "parallel_groups")]
fn py_parallel_groups(
    graph: PyRef<'_, DependencyGraph>,
    levels: Vec<Vec<String>>,
) -> PyResult<Vec<Vec<String>>> {
    Ok(parallel_groups(&graph, &levels)?)
}

/// Dependency-closure order for one node, the node itself last.
///
/// # Raises
/// * KeyError if the node does not exist
/// * ValueError if the closure contains a circular dependency
/// * RuntimeError if the graph is structurally broken
#[pyfunction]
#[pyo3(name = "resolve")]
fn py_resolve(graph: PyRef<'_, DependencyGraph>, node_id: &str) -> PyResult<Vec<String>> {
    Ok(resolve_dependencies(&graph, node_id)?)
}

/// Nodes that can start now, highest priority first. Never raises.
#[pyfunction]
#[pyo3(name = "ready_work", signature = (graph, config=None))]
fn py_ready_work(graph: PyRef<'_, DependencyGraph>, config: Option<EngineConfig>) -> Vec<String> {
    ready_work(&graph, &config.unwrap_or_default()).into_value()
}

/// Longest-path level -> node IDs. Never raises.
#[pyfunction]
#[pyo3(name = "work_levels", signature = (graph, config=None))]
fn py_work_levels(
    graph: PyRef<'_, DependencyGraph>,
    config: Option<EngineConfig>,
) -> BTreeMap<usize, Vec<String>> {
    work_levels(&graph, &config.unwrap_or_default()).into_value()
}

/// Pending work spread over `agent_count` agents. Never raises.
#[pyfunction]
#[pyo3(name = "assign_work", signature = (graph, agent_count, config=None))]
fn py_assign_work(
    graph: PyRef<'_, DependencyGraph>,
    agent_count: usize,
    config: Option<EngineConfig>,
) -> Vec<Vec<String>> {
    assign_work(&graph, agent_count, &config.unwrap_or_default()).into_value()
}

/// Structural consistency report. Never raises.
#[pyfunction]
#[pyo3(name = "validate")]
fn py_validate(graph: PyRef<'_, DependencyGraph>) -> ValidationReport {
    validate_graph(&graph)
}

/// The depsched.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<DependencyNode>()?;
    m.add_class::<DependencyEdge>()?;
    m.add_class::<DependencyGraph>()?;
    m.add_class::<TopologicalSort>()?;
    m.add_class::<ValidationReport>()?;

    // Config types
    m.add_class::<EngineConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_sort, m)?)?;
    m.add_function(wrap_pyfunction!(py_detect_cycles, m)?)?;
    m.add_function(wrap_pyfunction!(py_detect_cycles_in_subset, m)?)?;
    m.add_function(wrap_pyfunction!(py_critical_path, m)?)?;
    m.add_function(wrap_pyfunction!(py_parallel_groups, m)?)?;
    m.add_function(wrap_pyfunction!(py_resolve, m)?)?;
    m.add_function(wrap_pyfunction!(py_ready_work, m)?)?;
    m.add_function(wrap_pyfunction!(py_work_levels, m)?)?;
    m.add_function(wrap_pyfunction!(py_assign_work, m)?)?;
    m.add_function(wrap_pyfunction!(py_validate, m)?)?;

    Ok(())
}
