//! Configuration for the dependency engine.

use pyo3::prelude::*;

use crate::models::DependencyNode;

/// Engine-wide tuning knobs shared by every scheduling operation.
#[pyclass]
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Duration assumed for nodes without an explicit estimate
    #[pyo3(get, set)]
    pub default_duration: f64,
    /// Maximum |earliest_start - latest_start| for a node to count as critical
    #[pyo3(get, set)]
    pub critical_path_tolerance: f64,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_duration: 1.0,
            critical_path_tolerance: 0.01,
            verbosity: 0,
        }
    }
}

impl EngineConfig {
    /// Effective duration of a node, falling back to `default_duration`.
    #[inline]
    pub fn duration_of(&self, node: &DependencyNode) -> f64 {
        node.estimated_duration.unwrap_or(self.default_duration)
    }
}

#[pymethods]
impl EngineConfig {
    #[new]
    #[pyo3(signature = (default_duration=None, critical_path_tolerance=None, verbosity=None))]
    fn py_new(
        default_duration: Option<f64>,
        critical_path_tolerance: Option<f64>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            default_duration: default_duration.unwrap_or(defaults.default_duration),
            critical_path_tolerance: critical_path_tolerance
                .unwrap_or(defaults.critical_path_tolerance),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "EngineConfig(default_duration={}, critical_path_tolerance={}, verbosity={})",
            self.default_duration, self.critical_path_tolerance, self.verbosity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = EngineConfig::default();
        assert!((config.default_duration - 1.0).abs() < 1e-9);
        assert!((config.critical_path_tolerance - 0.01).abs() < 1e-9);
        assert_eq!(config.verbosity, 0);
    }

    #[test]
    fn test_duration_fallback() {
        let config = EngineConfig {
            default_duration: 2.5,
            ..EngineConfig::default()
        };
        let estimated = DependencyNode::new("a", 0).with_duration(4.0);
        let unestimated = DependencyNode::new("b", 0);

        assert_eq!(config.duration_of(&estimated), 4.0);
        assert_eq!(config.duration_of(&unestimated), 2.5);
    }
}
