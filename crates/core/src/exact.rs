//! Exact solver configuration and result types.
//!
//! The exact formulation selects a set of `(origin, orientation)` boxes with one
//! 0/1 variable each, maximizing the selected count (or volume) subject to every
//! unit cell being covered at most once. It is only tractable for small
//! containers and orientation catalogs.
//!
//! # Features
//!
//! - `ExactConfig`: time limit, gap tolerance, objective and backend choice
//! - `ExactResult`: objective, bound, gap and node statistics
//! - `SolutionStatus`: Optimal, Feasible, Infeasible, Timeout, Error
//!
//! # Example
//!
//! ```
//! use u_cubepack_core::exact::{ExactConfig, ExactObjective};
//!
//! let config = ExactConfig::default()
//!     .with_time_limit_ms(10_000)
//!     .with_gap_tolerance(0.01)
//!     .with_objective(ExactObjective::Count);
//! assert_eq!(config.time_limit_ms, 10_000);
//! ```

use crate::error::Error;
use crate::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Solution status from exact solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolutionStatus {
    /// Proven optimal (within the configured gap).
    Optimal,
    /// Feasible solution found, but optimality not proven.
    Feasible,
    /// Problem is infeasible.
    Infeasible,
    /// Time limit reached. See [`ExactResult::has_solution`].
    Timeout,
    /// Solver encountered an error.
    Error,
    /// Solution status unknown or not applicable.
    #[default]
    Unknown,
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimal => write!(f, "Optimal"),
            Self::Feasible => write!(f, "Feasible"),
            Self::Infeasible => write!(f, "Infeasible"),
            Self::Timeout => write!(f, "Timeout"),
            Self::Error => write!(f, "Error"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// What the exact model maximizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExactObjective {
    /// Number of selected boxes.
    #[default]
    Count,
    /// Total volume of selected boxes.
    Volume,
}

impl ExactObjective {
    /// Objective weight of one box with the given volume.
    pub fn weight(&self, volume: u64) -> f64 {
        match self {
            ExactObjective::Count => 1.0,
            ExactObjective::Volume => volume as f64,
        }
    }
}

/// Engine used to solve the exact model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExactBackend {
    /// Built-in depth-first branch-and-bound over cells.
    #[default]
    BranchAndBound,
    /// HiGHS MILP via `good_lp` (requires the `milp` feature).
    Milp,
}

/// Configuration for exact solvers.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExactConfig {
    /// Maximum computation time in milliseconds (0 = unlimited).
    pub time_limit_ms: u64,

    /// Relative gap tolerance (0.0 = optimal, 0.01 = 1% gap allowed).
    pub gap_tolerance: f64,

    /// Objective to maximize.
    pub objective: ExactObjective,

    /// Solving engine.
    pub backend: ExactBackend,

    /// Maximum number of candidate variables before the model is refused.
    pub max_candidates: usize,

    /// Verbosity level (0 = silent, 1 = summary, 2+ = detailed).
    pub verbosity: u32,
}

impl Default for ExactConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 60000,
            gap_tolerance: 0.0,
            objective: ExactObjective::Count,
            backend: ExactBackend::BranchAndBound,
            max_candidates: 200_000,
            verbosity: 0,
        }
    }
}

impl ExactConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Set relative gap tolerance.
    pub fn with_gap_tolerance(mut self, gap: f64) -> Self {
        self.gap_tolerance = gap;
        self
    }

    /// Set the objective.
    pub fn with_objective(mut self, objective: ExactObjective) -> Self {
        self.objective = objective;
        self
    }

    /// Set the solving backend.
    pub fn with_backend(mut self, backend: ExactBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Set the model size guard.
    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    /// Set verbosity level.
    pub fn with_verbosity(mut self, level: u32) -> Self {
        self.verbosity = level;
        self
    }

    /// Rejects a gap outside `[0, 1]` and a zero candidate limit.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.gap_tolerance) {
            return Err(Error::ConfigError(format!(
                "gap tolerance {} must be within [0, 1]",
                self.gap_tolerance
            )));
        }
        if self.max_candidates == 0 {
            return Err(Error::ConfigError("max_candidates must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Returns the time limit in seconds, if any.
    pub fn time_limit_secs(&self) -> Option<f64> {
        (self.time_limit_ms > 0).then(|| self.time_limit_ms as f64 / 1000.0)
    }
}

/// Extended result information from exact solver.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExactResult {
    /// Solution status.
    pub status: SolutionStatus,

    /// Best objective value found (higher is better).
    /// `f64::NEG_INFINITY` when no solution is available.
    pub objective_value: f64,

    /// Best upper bound on the optimal value.
    pub best_bound: f64,

    /// Optimality gap: (bound - objective) / bound.
    pub gap: f64,

    /// Number of search nodes explored (branch-and-bound only).
    pub nodes_explored: u64,

    /// Number of candidate variables in the model.
    pub candidates: usize,

    /// Whether the solution is proven optimal.
    pub is_optimal: bool,

    /// Solver-specific status message.
    pub message: String,
}

fn relative_gap(objective: f64, bound: f64) -> f64 {
    if bound.abs() > 1e-10 {
        ((bound - objective) / bound.abs()).max(0.0)
    } else {
        0.0
    }
}

impl ExactResult {
    /// Create a new result with default values.
    pub fn new() -> Self {
        Self {
            objective_value: f64::NEG_INFINITY,
            ..Default::default()
        }
    }

    /// Create a result indicating optimal solution.
    pub fn optimal(objective: f64) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            objective_value: objective,
            best_bound: objective,
            gap: 0.0,
            is_optimal: true,
            message: "Optimal solution found".to_string(),
            ..Default::default()
        }
    }

    /// Create a result proven optimal within `gap` of `bound`.
    pub fn optimal_within_gap(objective: f64, bound: f64) -> Self {
        let gap = relative_gap(objective, bound);
        Self {
            status: SolutionStatus::Optimal,
            objective_value: objective,
            best_bound: bound,
            gap,
            is_optimal: true,
            message: format!("Optimal within tolerance (gap: {:.2}%)", gap * 100.0),
            ..Default::default()
        }
    }

    /// Create a result indicating feasible (but not proven optimal) solution.
    pub fn feasible(objective: f64, bound: f64) -> Self {
        let gap = relative_gap(objective, bound);
        Self {
            status: SolutionStatus::Feasible,
            objective_value: objective,
            best_bound: bound,
            gap,
            is_optimal: false,
            message: format!("Feasible solution found (gap: {:.2}%)", gap * 100.0),
            ..Default::default()
        }
    }

    /// Create a result indicating infeasibility.
    pub fn infeasible() -> Self {
        Self {
            status: SolutionStatus::Infeasible,
            objective_value: f64::NEG_INFINITY,
            best_bound: f64::NEG_INFINITY,
            is_optimal: false,
            message: "Problem is infeasible".to_string(),
            ..Default::default()
        }
    }

    /// Create a result indicating timeout.
    pub fn timeout(best_objective: Option<f64>, best_bound: f64) -> Self {
        match best_objective {
            Some(obj) => {
                let gap = relative_gap(obj, best_bound);
                Self {
                    status: SolutionStatus::Timeout,
                    objective_value: obj,
                    best_bound,
                    gap,
                    is_optimal: false,
                    message: format!("Time limit reached (gap: {:.2}%)", gap * 100.0),
                    ..Default::default()
                }
            }
            None => Self {
                status: SolutionStatus::Timeout,
                objective_value: f64::NEG_INFINITY,
                best_bound,
                is_optimal: false,
                message: "Time limit reached without feasible solution".to_string(),
                ..Default::default()
            },
        }
    }

    /// Create a result indicating an error.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: SolutionStatus::Error,
            objective_value: f64::NEG_INFINITY,
            message: message.into(),
            ..Default::default()
        }
    }

    /// Returns true if a usable solution accompanies this result.
    ///
    /// A proven zero-block optimum has a solution; a timeout before any
    /// feasible point does not.
    pub fn has_solution(&self) -> bool {
        self.objective_value.is_finite()
            && matches!(
                self.status,
                SolutionStatus::Optimal | SolutionStatus::Feasible | SolutionStatus::Timeout
            )
    }

    /// Set solver statistics.
    pub fn with_stats(mut self, nodes: u64, candidates: usize) -> Self {
        self.nodes_explored = nodes;
        self.candidates = candidates;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_config_default() {
        let config = ExactConfig::default();
        assert_eq!(config.time_limit_ms, 60000);
        assert_eq!(config.gap_tolerance, 0.0);
        assert_eq!(config.objective, ExactObjective::Count);
        assert_eq!(config.backend, ExactBackend::BranchAndBound);
    }

    #[test]
    fn test_exact_config_builder() {
        let config = ExactConfig::new()
            .with_time_limit_ms(30000)
            .with_gap_tolerance(0.05)
            .with_objective(ExactObjective::Volume)
            .with_max_candidates(500);

        assert_eq!(config.time_limit_ms, 30000);
        assert_eq!(config.gap_tolerance, 0.05);
        assert_eq!(config.objective, ExactObjective::Volume);
        assert_eq!(config.max_candidates, 500);
        assert_eq!(config.time_limit_secs(), Some(30.0));
        assert_eq!(ExactConfig::new().with_time_limit_ms(0).time_limit_secs(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_exact_config_rejects_out_of_range_values() {
        let gap = ExactConfig::new().with_gap_tolerance(1.7);
        assert_eq!(gap.gap_tolerance, 1.7);
        assert!(matches!(gap.validate(), Err(Error::ConfigError(_))));

        let negative = ExactConfig::new().with_gap_tolerance(-0.1);
        assert!(matches!(negative.validate(), Err(Error::ConfigError(_))));

        let empty = ExactConfig::new().with_max_candidates(0);
        assert_eq!(empty.max_candidates, 0);
        assert!(matches!(empty.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_solution_status_display() {
        assert_eq!(format!("{}", SolutionStatus::Optimal), "Optimal");
        assert_eq!(format!("{}", SolutionStatus::Feasible), "Feasible");
        assert_eq!(format!("{}", SolutionStatus::Infeasible), "Infeasible");
        assert_eq!(format!("{}", SolutionStatus::Timeout), "Timeout");
    }

    #[test]
    fn test_zero_optimum_differs_from_empty_timeout() {
        let zero = ExactResult::optimal(0.0);
        let timed_out = ExactResult::timeout(None, 30.0);
        assert!(zero.has_solution());
        assert!(!timed_out.has_solution());
        assert_eq!(timed_out.status, SolutionStatus::Timeout);
    }

    #[test]
    fn test_exact_result_feasible_gap() {
        let result = ExactResult::feasible(90.0, 100.0);
        assert_eq!(result.status, SolutionStatus::Feasible);
        assert!((result.gap - 0.10).abs() < 1e-10);
        assert!(!result.is_optimal);
        assert!(result.has_solution());
    }

    #[test]
    fn test_exact_result_timeout_with_incumbent() {
        let result = ExactResult::timeout(Some(28.0), 30.0);
        assert!(result.has_solution());
        assert!(result.message.contains("Time limit"));
    }

    #[test]
    fn test_exact_result_with_stats() {
        let result = ExactResult::optimal(100.0).with_stats(1000, 5000);
        assert_eq!(result.nodes_explored, 1000);
        assert_eq!(result.candidates, 5000);
    }

    #[test]
    fn test_objective_weight() {
        assert_eq!(ExactObjective::Count.weight(8), 1.0);
        assert_eq!(ExactObjective::Volume.weight(8), 8.0);
    }
}
