//! Solve result representation.

use crate::exact::{ExactResult, SolutionStatus};
use crate::geometry::GeometryId;
use crate::placement::{Placement, PlacementStats};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of a packing solve operation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveResult {
    /// Placements for all successfully placed block instances, in commit order.
    pub placements: Vec<Placement>,

    /// Number of block instances requested.
    pub requested: usize,

    /// Utilization ratio (0.0 - 1.0): placed volume / container volume.
    pub utilization: f64,

    /// IDs of block instances that were not placed (one entry per instance).
    pub unplaced: Vec<GeometryId>,

    /// IDs of block types that fit in no orientation at all.
    pub unplaceable: Vec<GeometryId>,

    /// Computation time in milliseconds.
    pub computation_time_ms: u64,

    /// Best fitness value achieved (stochastic strategies).
    pub best_fitness: Option<f64>,

    /// Exact solver outcome (exact and exact-hybrid strategies).
    pub exact: Option<ExactResult>,

    /// Strategy used for solving.
    pub strategy: Option<String>,
}

impl SolveResult {
    /// Creates a new empty result.
    pub fn new() -> Self {
        Self {
            placements: Vec::new(),
            requested: 0,
            utilization: 0.0,
            unplaced: Vec::new(),
            unplaceable: Vec::new(),
            computation_time_ms: 0,
            best_fitness: None,
            exact: None,
            strategy: None,
        }
    }

    /// Returns true if every requested instance was placed.
    pub fn all_placed(&self) -> bool {
        self.unplaced.is_empty() && self.placements.len() == self.requested
    }

    /// Returns the number of placed block instances.
    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }

    /// Returns the number of requested instances that were not placed.
    pub fn unplaced_count(&self) -> usize {
        self.requested.saturating_sub(self.placements.len())
    }

    /// Returns the exact solver status, if an exact solver ran.
    pub fn solution_status(&self) -> Option<SolutionStatus> {
        self.exact.as_ref().map(|e| e.status)
    }

    /// Returns true if an exact solver ran out of time before finding any
    /// feasible solution.
    pub fn timed_out_without_solution(&self) -> bool {
        self.exact
            .as_ref()
            .is_some_and(|e| e.status == SolutionStatus::Timeout && !e.has_solution())
    }

    /// Sets the strategy name.
    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    /// Sets the best fitness.
    pub fn with_best_fitness(mut self, fitness: f64) -> Self {
        self.best_fitness = Some(fitness);
        self
    }

    /// Removes duplicate entries from the unplaced list.
    pub fn deduplicate_unplaced(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.unplaced.retain(|id| seen.insert(id.clone()));
    }

    /// Computes placement statistics.
    pub fn placement_stats(&self) -> PlacementStats {
        PlacementStats::from_placements(&self.placements)
    }

    /// Returns utilization as a percentage string.
    pub fn utilization_percent(&self) -> String {
        format!("{:.1}%", self.utilization * 100.0)
    }

    /// Recomputes utilization for a container of the given volume.
    pub fn update_utilization(&mut self, container_volume: u64) {
        let placed: u64 = self.placements.iter().map(|p| p.volume()).sum();
        self.utilization = if container_volume > 0 {
            placed as f64 / container_volume as f64
        } else {
            0.0
        };
    }
}

impl Default for SolveResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary statistics for a solve result.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveSummary {
    /// Total block instances requested.
    pub total_requested: usize,
    /// Total block instances placed.
    pub total_placed: usize,
    /// Utilization percentage.
    pub utilization_percent: f64,
    /// Computation time in milliseconds.
    pub time_ms: u64,
    /// Strategy used.
    pub strategy: String,
}

impl From<&SolveResult> for SolveSummary {
    fn from(result: &SolveResult) -> Self {
        Self {
            total_requested: result.requested,
            total_placed: result.placements.len(),
            utilization_percent: result.utilization * 100.0,
            time_ms: result.computation_time_ms,
            strategy: result
                .strategy
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_result_new() {
        let result = SolveResult::new();
        assert!(result.placements.is_empty());
        assert_eq!(result.utilization, 0.0);
        assert!(result.all_placed());
        assert!(!result.timed_out_without_solution());
    }

    #[test]
    fn test_result_with_placements() {
        let mut result = SolveResult::new();
        result.requested = 2;
        result
            .placements
            .push(Placement::new("test", 0, [0, 0, 0], [2, 3, 4], 0));
        result.update_utilization(48);

        assert_eq!(result.placed_count(), 1);
        assert_eq!(result.unplaced_count(), 1);
        assert!(!result.all_placed());
        assert_relative_eq!(result.utilization, 0.5);

        result.requested = 0;
        assert!(!result.all_placed());
        assert_eq!(result.utilization_percent(), "50.0%");
    }

    #[test]
    fn test_timeout_flag() {
        let mut result = SolveResult::new();
        result.exact = Some(ExactResult::timeout(None, 10.0));
        assert!(result.timed_out_without_solution());
        assert_eq!(result.solution_status(), Some(SolutionStatus::Timeout));

        result.exact = Some(ExactResult::optimal(0.0));
        assert!(!result.timed_out_without_solution());
    }

    #[test]
    fn test_solve_summary() {
        let mut result = SolveResult::new();
        result
            .placements
            .push(Placement::new("test", 0, [0, 0, 0], [1, 1, 1], 0));
        result.requested = 4;
        result.utilization = 0.75;
        result.computation_time_ms = 100;
        result.strategy = Some("Greedy".to_string());

        let summary = SolveSummary::from(&result);
        assert_eq!(summary.total_placed, 1);
        assert_eq!(summary.total_requested, 4);
        assert_eq!(summary.utilization_percent, 75.0);
        assert_eq!(summary.strategy, "Greedy");
    }

    #[test]
    fn test_deduplicate_unplaced() {
        let mut result = SolveResult::new();
        for id in ["G1", "G1", "G2", "G1", "G2"] {
            result.unplaced.push(id.to_string());
        }
        result.deduplicate_unplaced();
        assert_eq!(result.unplaced, vec!["G1".to_string(), "G2".to_string()]);
    }
}
