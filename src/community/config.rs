//! Detector configuration and caller-imposed budgets.

use crate::error::{Error, Result};
use crate::graph::DEFAULT_WEIGHT_KEY;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::warn;

/// Configuration shared by all detectors.
///
/// Fields a detector does not use are ignored by it. Deserializes with
/// defaults for every missing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityConfig {
    /// Resolution (gamma) on the expected-weight term.
    ///
    /// Higher values produce smaller communities. Reported modularity uses
    /// the same value.
    pub resolution: f64,
    /// Maximum Louvain aggregation passes. `None` runs until convergence.
    pub max_passes: Option<usize>,
    /// Maximum local-moving sweeps per Louvain pass.
    pub max_sweeps: usize,
    /// Minimum modularity improvement for a Louvain pass to be kept.
    pub epsilon: f64,
    /// Edge attribute read as weight.
    pub weight_key: String,
    /// Girvan-Newman: use weighted shortest paths (weight as distance).
    ///
    /// Every edge must then weigh more than zero.
    pub use_weighted_betweenness: bool,
    /// Fail with [`Error::EmptyGraph`] instead of returning a trivial result.
    pub require_nodes: bool,
    /// Caller-imposed iteration or time budget.
    pub budget: Option<Budget>,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            max_passes: None,
            max_sweeps: 100,
            epsilon: 1e-7,
            weight_key: DEFAULT_WEIGHT_KEY.to_string(),
            use_weighted_betweenness: false,
            require_nodes: false,
            budget: None,
        }
    }
}

impl CommunityConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set resolution parameter.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Cap the number of Louvain aggregation passes.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = Some(max_passes);
        self
    }

    /// Set maximum local-moving sweeps per pass.
    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }

    /// Set minimum modularity improvement per pass.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Read edge weights from `key`.
    pub fn with_weight_key(mut self, key: impl Into<String>) -> Self {
        self.weight_key = key.into();
        self
    }

    /// Toggle weighted betweenness for Girvan-Newman.
    pub fn with_weighted_betweenness(mut self, weighted: bool) -> Self {
        self.use_weighted_betweenness = weighted;
        self
    }

    /// Reject graphs without nodes.
    pub fn with_require_nodes(mut self, require: bool) -> Self {
        self.require_nodes = require;
        self
    }

    /// Impose a budget.
    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "resolution",
                message: "must be finite and positive",
            });
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(Error::InvalidParameter {
                name: "epsilon",
                message: "must be finite and non-negative",
            });
        }
        if self.max_sweeps == 0 {
            return Err(Error::InvalidParameter {
                name: "max_sweeps",
                message: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// Iteration and wall-clock limits imposed by a caller.
///
/// Louvain counts one iteration per local-moving sweep; Girvan-Newman counts
/// one per edge-removal round. Exceeding either limit fails the run with
/// [`Error::BudgetExceeded`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Budget {
    /// Maximum iterations.
    pub max_iterations: Option<usize>,
    /// Maximum wall-clock time.
    pub max_duration: Option<Duration>,
}

impl Budget {
    /// Limit iterations.
    pub fn iterations(max_iterations: usize) -> Self {
        Self {
            max_iterations: Some(max_iterations),
            max_duration: None,
        }
    }

    /// Limit wall-clock time.
    pub fn duration(max_duration: Duration) -> Self {
        Self {
            max_iterations: None,
            max_duration: Some(max_duration),
        }
    }
}

/// Per-run budget accounting.
pub(crate) struct BudgetTracker {
    algorithm: &'static str,
    budget: Budget,
    started: Instant,
    iterations: usize,
}

impl BudgetTracker {
    pub(crate) fn new(algorithm: &'static str, budget: Option<Budget>) -> Self {
        Self {
            algorithm,
            budget: budget.unwrap_or_default(),
            started: Instant::now(),
            iterations: 0,
        }
    }

    /// Count one iteration and check both limits.
    pub(crate) fn tick(&mut self) -> Result<()> {
        self.iterations += 1;
        if let Some(max) = self.budget.max_iterations {
            if self.iterations > max {
                warn!(algorithm = self.algorithm, max, "iteration budget exhausted");
                return Err(Error::BudgetExceeded {
                    algorithm: self.algorithm,
                    limit: format!("{max} iterations"),
                });
            }
        }
        if let Some(max) = self.budget.max_duration {
            if self.started.elapsed() >= max {
                warn!(algorithm = self.algorithm, ?max, "time budget exhausted");
                return Err(Error::BudgetExceeded {
                    algorithm: self.algorithm,
                    limit: format!("{max:?}"),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn iterations(&self) -> usize {
        self.iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CommunityConfig::default();
        assert_eq!(config.resolution, 1.0);
        assert_eq!(config.max_passes, None);
        assert_eq!(config.epsilon, 1e-7);
        assert_eq!(config.weight_key, "weight");
        assert!(!config.use_weighted_betweenness);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_resolution() {
        let config = CommunityConfig::new().with_resolution(0.0);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidParameter {
                name: "resolution",
                ..
            })
        ));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: CommunityConfig =
            serde_json::from_str(r#"{"resolution": 0.5, "weight_key": "w"}"#).unwrap();
        assert_eq!(config.resolution, 0.5);
        assert_eq!(config.weight_key, "w");
        assert_eq!(config.max_sweeps, 100);
    }

    #[test]
    fn test_iteration_budget() {
        let mut tracker = BudgetTracker::new("louvain", Some(Budget::iterations(2)));
        assert!(tracker.tick().is_ok());
        assert!(tracker.tick().is_ok());
        assert!(matches!(
            tracker.tick(),
            Err(Error::BudgetExceeded {
                algorithm: "louvain",
                ..
            })
        ));
        assert_eq!(tracker.iterations(), 3);
    }

    #[test]
    fn test_duration_budget() {
        let budget = Budget::duration(Duration::ZERO);
        let mut tracker = BudgetTracker::new("girvan_newman", Some(budget));
        let err = tracker.tick().unwrap_err();
        assert_eq!(
            err,
            Error::BudgetExceeded {
                algorithm: "girvan_newman",
                limit: "0ns".to_string(),
            }
        );

        let budget = Budget::duration(Duration::from_secs(3600));
        let mut roomy = BudgetTracker::new("louvain", Some(budget));
        assert!(roomy.tick().is_ok());
    }

    #[test]
    fn test_unbounded_tracker_never_fails() {
        let mut tracker = BudgetTracker::new("girvan_newman", None);
        for _ in 0..1000 {
            assert!(tracker.tick().is_ok());
        }
    }
}
