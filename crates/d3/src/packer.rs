//! 3D placement solver.

use crate::boundary::Container;
use crate::capacity::{self, CapacityEstimate};
use crate::exact_solver::{solve_exact, ExactSolution};
use crate::geometry::{
    block_catalog, blocks_from_triples, expand_instances, sort_instances, BlockInstance, BlockType,
};
use crate::greedy::{run_greedy, GreedyConfig};
use crate::hybrid::{assign_instances, combine};
use crate::stochastic::run_stochastic;
use u_cubepack_core::exact::{ExactBackend, ExactConfig};
use u_cubepack_core::geometry::{Boundary, Dims, Geometry};
use u_cubepack_core::population::PopulationConfig;
use u_cubepack_core::solver::{Config, Solver, Strategy};
use u_cubepack_core::{Error, ExactResult, Placement, Result, SolveResult};

use std::time::Instant;

/// 3D placement solver.
#[derive(Debug, Clone)]
pub struct Packer3D {
    config: Config,
    backend: ExactBackend,
    max_candidates: usize,
}

/// Placements of one strategy run plus what the result needs to know about it.
struct RunOutput {
    placements: Vec<Placement>,
    /// Instance indices left unplaced.
    unplaced: Vec<usize>,
    best_fitness: Option<f64>,
    exact: Option<ExactResult>,
}

impl Packer3D {
    /// Creates a new packer with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            backend: ExactBackend::default(),
            max_candidates: ExactConfig::default().max_candidates,
        }
    }

    /// Creates a packer with default configuration.
    pub fn default_config() -> Self {
        Self::new(Config::default())
    }

    /// Selects the exact backend.
    pub fn with_backend(mut self, backend: ExactBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Caps the exact model size.
    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Exact solver settings derived from the configuration.
    pub fn exact_config(&self) -> ExactConfig {
        ExactConfig::new()
            .with_time_limit_ms(self.config.time_limit_ms)
            .with_gap_tolerance(self.config.gap_tolerance)
            .with_objective(self.config.objective)
            .with_backend(self.backend)
            .with_max_candidates(self.max_candidates)
    }

    /// Population settings derived from the configuration.
    pub fn population_config(&self) -> PopulationConfig {
        PopulationConfig {
            population_size: self.config.population_size,
            seed: self.config.seed,
        }
    }

    fn greedy_config(&self) -> GreedyConfig {
        GreedyConfig::new()
            .with_failure_policy(self.config.failure_policy)
            .with_rotation(self.config.allow_rotation)
    }

    /// Checks the configuration, the container and every block type.
    pub fn validate(&self, blocks: &[BlockType], container: &Container) -> Result<()> {
        self.config.validate()?;
        self.exact_config().validate()?;
        container.validate()?;
        for block in blocks {
            block.validate()?;
        }
        Ok(())
    }

    /// Fails on the first block type that fits the container in no orientation.
    pub fn check_placeable(&self, blocks: &[BlockType], container: &Container) -> Result<()> {
        blocks
            .iter()
            .try_for_each(|b| capacity::ensure_placeable(b, container, self.config.allow_rotation))
    }

    /// Volume-based bounds for a request.
    pub fn estimate_capacity(
        &self,
        blocks: &[BlockType],
        container: &Container,
    ) -> CapacityEstimate {
        capacity::estimate(blocks, container, self.config.allow_rotation)
    }

    /// Solves a flat per-instance list of triples.
    pub fn solve_triples(&self, triples: &[Dims], container: &Container) -> Result<SolveResult> {
        self.solve(&blocks_from_triples(triples), container)
    }

    /// Keeps the catalog placements that claim a requested instance.
    fn assigned(&self, instances: &[BlockInstance], placements: &[Placement]) -> RunOutput {
        let assignment = assign_instances(instances, placements, self.config.allow_rotation);
        if assignment.unmatched > 0 {
            log::debug!(
                "{} catalog placements beyond the requested instances dropped",
                assignment.unmatched
            );
        }
        RunOutput {
            placements: assignment.placements,
            unplaced: assignment.unplaced,
            best_fitness: None,
            exact: None,
        }
    }

    fn greedy(&self, instances: &[BlockInstance], container: &Container) -> RunOutput {
        let outcome = run_greedy(container, instances, &self.greedy_config());
        RunOutput {
            placements: outcome.placements,
            unplaced: outcome.unplaced,
            best_fitness: None,
            exact: None,
        }
    }

    fn stochastic(
        &self,
        blocks: &[BlockType],
        instances: &[BlockInstance],
        container: &Container,
        estimate: &CapacityEstimate,
        warm_start: bool,
    ) -> RunOutput {
        let catalog = block_catalog(blocks, self.config.allow_rotation);
        let n = self
            .config
            .instance_count
            .unwrap_or(estimate.count_upper_bound);
        let outcome = run_stochastic(container, &catalog, n, &self.population_config());
        let best_fitness = outcome.best_fitness.map(f64::from);

        if warm_start {
            let hybrid = combine(
                container,
                instances,
                &outcome.placements,
                &self.greedy_config(),
            );
            RunOutput {
                placements: hybrid.placements,
                unplaced: hybrid.unplaced,
                best_fitness,
                exact: None,
            }
        } else {
            RunOutput {
                best_fitness,
                ..self.assigned(instances, &outcome.placements)
            }
        }
    }

    fn exact(
        &self,
        blocks: &[BlockType],
        instances: &[BlockInstance],
        container: &Container,
        warm_start: bool,
    ) -> Result<RunOutput> {
        let catalog = block_catalog(blocks, self.config.allow_rotation);
        let solution = match solve_exact(container, &catalog, &self.exact_config()) {
            Ok(solution) => solution,
            Err(e) if warm_start => {
                log::warn!("exact warm start skipped: {}", e);
                ExactSolution::empty(ExactResult::error(e.to_string()))
            }
            Err(e) => return Err(e),
        };

        if !solution.result.has_solution() {
            log::warn!("exact solver: {}", solution.result.message);
        }

        if warm_start {
            let hybrid = combine(
                container,
                instances,
                &solution.placements,
                &self.greedy_config(),
            );
            Ok(RunOutput {
                placements: hybrid.placements,
                unplaced: hybrid.unplaced,
                best_fitness: None,
                exact: Some(solution.result),
            })
        } else {
            Ok(RunOutput {
                exact: Some(solution.result),
                ..self.assigned(instances, &solution.placements)
            })
        }
    }
}

impl Default for Packer3D {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Solver for Packer3D {
    type Geometry = BlockType;
    type Boundary = Container;

    fn solve(
        &self,
        geometries: &[Self::Geometry],
        boundary: &Self::Boundary,
    ) -> Result<SolveResult> {
        let start = Instant::now();
        self.validate(geometries, boundary)?;

        let estimate = self.estimate_capacity(geometries, boundary);
        for id in &estimate.unplaceable {
            log::warn!("block '{}' fits the container in no orientation", id);
        }

        // Unplaceable blocks are reported up front and kept out of the search.
        let (placeable, unplaceable): (Vec<BlockType>, Vec<BlockType>) = geometries
            .iter()
            .cloned()
            .partition(|b| capacity::is_placeable(b, boundary, self.config.allow_rotation));

        let mut instances = expand_instances(&placeable);
        sort_instances(&mut instances, self.config.search_order);

        log::debug!(
            "solving {} instances ({} block types) with {}",
            instances.len(),
            placeable.len(),
            self.config.strategy.name()
        );

        let run = match self.config.strategy {
            Strategy::Greedy => self.greedy(&instances, boundary),
            Strategy::Stochastic => {
                self.stochastic(&placeable, &instances, boundary, &estimate, false)
            }
            Strategy::HybridStochastic => {
                self.stochastic(&placeable, &instances, boundary, &estimate, true)
            }
            Strategy::Exact => self.exact(&placeable, &instances, boundary, false)?,
            Strategy::HybridExact => self.exact(&placeable, &instances, boundary, true)?,
        };

        let mut result = SolveResult::new().with_strategy(self.config.strategy.name());
        result.requested = geometries.iter().map(|b| b.quantity()).sum();
        result.placements = run.placements;
        result.unplaced = run
            .unplaced
            .iter()
            .map(|&i| instances[i].block_id.clone())
            .collect();
        for block in &unplaceable {
            result
                .unplaced
                .extend(std::iter::repeat(block.id().clone()).take(block.quantity()));
        }
        result.unplaceable = estimate.unplaceable;
        result.best_fitness = run.best_fitness;
        result.exact = run.exact;
        result.update_utilization(boundary.measure());
        result.computation_time_ms = start.elapsed().as_millis() as u64;

        log::info!(
            "{}: placed {}/{} ({}) in {} ms",
            self.config.strategy.name(),
            result.placements.len(),
            result.requested,
            result.utilization_percent(),
            result.computation_time_ms
        );

        Ok(result)
    }
}

/// Fails with [`Error::Internal`] if any two placements overlap or one leaves
/// the container.
pub fn verify_solution(container: &Container, placements: &[Placement]) -> Result<()> {
    crate::occupancy::audit(container, placements)
        .map_err(|failure| Error::Internal(failure.to_string()))
}
