//! Solver traits and configuration.

use crate::error::Error;
use crate::exact::ExactObjective;
use crate::geometry::{Boundary, Geometry};
use crate::result::SolveResult;
use crate::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Placement strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strategy {
    /// First-fit scan over origins and orientations (fast, deterministic).
    #[default]
    Greedy,
    /// Random population scored in parallel, then collision-filtered.
    Stochastic,
    /// 0/1 assignment model over (origin, orientation) pairs.
    Exact,
    /// Stochastic warm start completed by a greedy fill.
    HybridStochastic,
    /// Time-limited exact warm start completed by a greedy fill.
    HybridExact,
}

impl Strategy {
    /// Short name used in results and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Greedy => "Greedy",
            Strategy::Stochastic => "Stochastic",
            Strategy::Exact => "Exact",
            Strategy::HybridStochastic => "HybridStochastic",
            Strategy::HybridExact => "HybridExact",
        }
    }

    /// Returns true for strategies that finish with a greedy fill.
    pub fn is_hybrid(&self) -> bool {
        matches!(self, Strategy::HybridStochastic | Strategy::HybridExact)
    }
}

/// Order applied to the requested blocks before greedy and hybrid runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SearchOrder {
    /// Keep the caller's order.
    AsGiven,
    /// Largest volume first (stable for equal volumes).
    #[default]
    VolumeDescending,
    /// Smallest volume first (stable for equal volumes).
    VolumeAscending,
}

/// What the greedy scan does when a block instance cannot be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FailurePolicy {
    /// Stop attempting every later instance once one fails.
    #[default]
    StopOnFirstFailure,
    /// Leave the failed instance out and keep going with the next one.
    SkipAndContinue,
}

/// Common configuration for solvers.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Placement strategy.
    pub strategy: Strategy,

    /// Sort order applied to the block list before greedy/hybrid runs.
    pub search_order: SearchOrder,

    /// Greedy behaviour on the first unplaceable instance.
    pub failure_policy: FailurePolicy,

    /// Whether blocks may be rotated (per-block settings still apply).
    pub allow_rotation: bool,

    /// Exact solver time limit in milliseconds (0 = unlimited).
    pub time_limit_ms: u64,

    /// Acceptable relative optimality gap for the exact solver (0.0 - 1.0).
    pub gap_tolerance: f64,

    /// Exact objective (count or volume).
    pub objective: ExactObjective,

    /// Population size for the stochastic heuristic.
    pub population_size: usize,

    /// Number of placements each stochastic individual draws
    /// (None = capacity estimate).
    pub instance_count: Option<usize>,

    /// Random seed (None = entropy).
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            search_order: SearchOrder::default(),
            failure_policy: FailurePolicy::default(),
            allow_rotation: true,
            time_limit_ms: 30000,
            gap_tolerance: 0.0,
            objective: ExactObjective::default(),
            population_size: 100,
            instance_count: None,
            seed: None,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the placement strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the search order.
    pub fn with_search_order(mut self, order: SearchOrder) -> Self {
        self.search_order = order;
        self
    }

    /// Sets the greedy failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Enables or disables rotation.
    pub fn with_rotation(mut self, allow: bool) -> Self {
        self.allow_rotation = allow;
        self
    }

    /// Sets the time limit in milliseconds.
    pub fn with_time_limit(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Sets the relative optimality gap.
    pub fn with_gap_tolerance(mut self, gap: f64) -> Self {
        self.gap_tolerance = gap;
        self
    }

    /// Sets the exact objective.
    pub fn with_objective(mut self, objective: ExactObjective) -> Self {
        self.objective = objective;
        self
    }

    /// Sets the stochastic population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the number of placements per stochastic individual.
    pub fn with_instance_count(mut self, n: usize) -> Self {
        self.instance_count = Some(n);
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks knob values.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.gap_tolerance) {
            return Err(Error::ConfigError(format!(
                "gap tolerance {} must be within [0, 1]",
                self.gap_tolerance
            )));
        }
        Ok(())
    }
}

/// Trait for packing solvers.
pub trait Solver {
    /// The block type this solver handles.
    type Geometry: Geometry;
    /// The container type this solver handles.
    type Boundary: Boundary;

    /// Solves the packing problem.
    fn solve(
        &self,
        geometries: &[Self::Geometry],
        boundary: &Self::Boundary,
    ) -> Result<SolveResult>;
}
