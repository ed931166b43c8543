//! Stochastic population heuristic.
//!
//! An individual is a list of `N` placements drawn independently: each origin
//! coordinate is uniform over the full container extent (not shrunk by the box
//! size) and the orientation is uniform over the catalog. Fitness counts the
//! placements that lie inside the container and ignores mutual overlap, so
//! individuals are scored in parallel without touching any grid.
//!
//! The best individual (first one on ties) is then replayed in order through
//! an [`OccupancyGrid`]; placements that leave the container or hit an earlier
//! accepted placement are dropped. Only the filtered list is a valid solution.

use crate::boundary::Container;
use crate::occupancy::OccupancyGrid;
use crate::orientation::CatalogEntry;
use rand::Rng;
use std::time::Duration;
use u_cubepack_core::geometry::{Boundary, Dims};
use u_cubepack_core::population::{PopulationConfig, PopulationProblem, PopulationRunner};
use u_cubepack_core::Placement;

/// One drawn placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gene {
    /// Box origin.
    pub origin: Dims,
    /// Index into the catalog.
    pub orientation: usize,
}

/// Random placement problem over a fixed orientation catalog.
pub struct StochasticProblem<'a> {
    container: Dims,
    catalog: &'a [CatalogEntry],
    instance_count: usize,
}

impl<'a> StochasticProblem<'a> {
    /// Creates a problem drawing `instance_count` placements per individual.
    pub fn new(container: &Container, catalog: &'a [CatalogEntry], instance_count: usize) -> Self {
        Self {
            container: container.dimensions(),
            catalog,
            instance_count,
        }
    }

    /// Returns true if the gene's box lies inside the container.
    pub fn in_bounds(&self, gene: &Gene) -> bool {
        let dims = self.catalog[gene.orientation].dims;
        (0..3).all(|axis| {
            gene.origin[axis] as u64 + dims[axis] as u64 <= self.container[axis] as u64
        })
    }
}

impl PopulationProblem for StochasticProblem<'_> {
    type Individual = Vec<Gene>;
    type Fitness = u32;

    fn random_individual<R: Rng>(&self, rng: &mut R) -> Vec<Gene> {
        if self.catalog.is_empty() {
            return Vec::new();
        }
        let [w, d, h] = self.container;
        (0..self.instance_count)
            .map(|_| Gene {
                origin: [rng.gen_range(0..w), rng.gen_range(0..d), rng.gen_range(0..h)],
                orientation: rng.gen_range(0..self.catalog.len()),
            })
            .collect()
    }

    fn fitness(&self, individual: &Vec<Gene>) -> u32 {
        individual.iter().filter(|g| self.in_bounds(g)).count() as u32
    }
}

/// Output of a stochastic run.
#[derive(Debug, Clone, Default)]
pub struct StochasticOutcome {
    /// Filtered placements, in draw order.
    pub placements: Vec<Placement>,
    /// Fitness of the winning individual before filtering.
    pub best_fitness: Option<u32>,
    /// Population index of the winning individual.
    pub best_index: Option<usize>,
    /// Placements dropped by the collision filter.
    pub discarded: usize,
    /// Time spent drawing and scoring.
    pub elapsed: Duration,
}

/// Replays an individual through a fresh grid, keeping the placements that fit.
///
/// Returns the accepted placements and the number dropped.
pub fn filter_individual(
    container: &Container,
    catalog: &[CatalogEntry],
    individual: &[Gene],
) -> (Vec<Placement>, usize) {
    let mut grid = OccupancyGrid::new(container);
    let mut placements = Vec::with_capacity(individual.len());
    for (i, gene) in individual.iter().enumerate() {
        let entry = &catalog[gene.orientation];
        if grid.try_commit(gene.origin, entry.dims) {
            placements.push(Placement::new(
                entry.block_id.clone(),
                i,
                gene.origin,
                entry.dims,
                gene.orientation,
            ));
        }
    }
    let discarded = individual.len() - placements.len();
    (placements, discarded)
}

/// Runs the stochastic heuristic with the configured seed (or entropy).
pub fn run_stochastic(
    container: &Container,
    catalog: &[CatalogEntry],
    instance_count: usize,
    config: &PopulationConfig,
) -> StochasticOutcome {
    let mut rng = config.rng();
    run_stochastic_with_rng(container, catalog, instance_count, config, &mut rng)
}

/// Runs the stochastic heuristic with a caller-owned random source.
pub fn run_stochastic_with_rng<R: Rng>(
    container: &Container,
    catalog: &[CatalogEntry],
    instance_count: usize,
    config: &PopulationConfig,
    rng: &mut R,
) -> StochasticOutcome {
    if config.population_size == 0 || instance_count == 0 || catalog.is_empty() {
        return StochasticOutcome::default();
    }

    let problem = StochasticProblem::new(container, catalog, instance_count);
    let runner = PopulationRunner::new(config.clone(), problem);
    let result = runner.run_with_rng(rng);

    let Some(best) = result.best else {
        return StochasticOutcome {
            elapsed: result.elapsed,
            ..Default::default()
        };
    };

    let (placements, discarded) = filter_individual(container, catalog, &best);
    log::debug!(
        "stochastic: {} of {} drawn placements kept ({} in bounds)",
        placements.len(),
        best.len(),
        result.best_fitness.unwrap_or(0)
    );

    StochasticOutcome {
        placements,
        best_fitness: result.best_fitness,
        best_index: result.best_index,
        discarded,
        elapsed: result.elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occupancy::audit;
    use crate::orientation::catalog_from_dims;

    fn config(size: usize, seed: u64) -> PopulationConfig {
        PopulationConfig::new().with_population_size(size).with_seed(seed)
    }

    #[test]
    fn test_empty_when_no_instances() {
        let container = Container::new(4, 4, 4).unwrap();
        let catalog = catalog_from_dims(&[[1, 1, 1]]);
        let outcome = run_stochastic(&container, &catalog, 0, &config(1, 3));
        assert!(outcome.placements.is_empty());
        assert!(outcome.best_fitness.is_none());
    }

    #[test]
    fn test_empty_when_no_population() {
        let container = Container::new(4, 4, 4).unwrap();
        let catalog = catalog_from_dims(&[[1, 1, 1]]);
        let outcome = run_stochastic(&container, &catalog, 10, &config(0, 3));
        assert!(outcome.placements.is_empty());
    }

    #[test]
    fn test_filtered_solution_is_valid() {
        let container = Container::new(6, 5, 4).unwrap();
        let catalog = catalog_from_dims(&[[2, 1, 1], [1, 2, 1], [1, 1, 2], [2, 2, 2]]);
        let outcome = run_stochastic(&container, &catalog, 40, &config(50, 11));
        assert!(!outcome.placements.is_empty());
        assert!(outcome.placements.len() <= 40);
        assert!(audit(&container, &outcome.placements).is_ok());
        assert_eq!(
            outcome.placements.len() + outcome.discarded,
            40,
            "every drawn placement is either kept or discarded"
        );
        assert!(outcome.placements.len() as u32 <= outcome.best_fitness.unwrap());
    }

    #[test]
    fn test_same_seed_same_result() {
        let container = Container::new(5, 5, 5).unwrap();
        let catalog = catalog_from_dims(&[[1, 2, 3], [3, 2, 1]]);
        let a = run_stochastic(&container, &catalog, 12, &config(20, 42));
        let b = run_stochastic(&container, &catalog, 12, &config(20, 42));
        assert_eq!(a.placements, b.placements);
        assert_eq!(a.best_index, b.best_index);
    }

    #[test]
    fn test_oversized_block_is_filtered_out() {
        let container = Container::new(1, 1, 1).unwrap();
        let catalog = catalog_from_dims(&[[2, 1, 1], [1, 2, 1], [1, 1, 2]]);
        let outcome = run_stochastic(&container, &catalog, 3, &config(8, 5));
        assert!(outcome.placements.is_empty());
        assert_eq!(outcome.best_fitness, Some(0));
        assert_eq!(outcome.discarded, 3);
    }

    #[test]
    fn test_fitness_ignores_overlap() {
        let container = Container::new(2, 2, 2).unwrap();
        let catalog = catalog_from_dims(&[[2, 2, 2]]);
        let problem = StochasticProblem::new(&container, &catalog, 2);
        let stacked = vec![
            Gene {
                origin: [0, 0, 0],
                orientation: 0,
            },
            Gene {
                origin: [0, 0, 0],
                orientation: 0,
            },
        ];
        assert_eq!(problem.fitness(&stacked), 2);
        let (kept, dropped) = filter_individual(&container, &catalog, &stacked);
        assert_eq!(kept.len(), 1);
        assert_eq!(dropped, 1);
    }
}
