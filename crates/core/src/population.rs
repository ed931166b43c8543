//! Single-generation population search framework.
//!
//! A [`PopulationProblem`] draws random individuals and scores each one with an
//! independent fitness function. Drawing is sequential on one random source, so a
//! seeded run always produces the same population. Scoring is a parallel map over
//! the population (rayon) and must not share mutable state between individuals.
//!
//! The best individual is the one with the highest fitness; ties go to the
//! lowest population index.

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for a population run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PopulationConfig {
    /// Number of individuals drawn.
    pub population_size: usize,
    /// Random seed (None = entropy).
    pub seed: Option<u64>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            seed: None,
        }
    }
}

impl PopulationConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the random source for a run.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Trait for problem-specific population operations.
pub trait PopulationProblem: Send + Sync {
    /// The individual type for this problem.
    type Individual: Clone + Send + Sync;

    /// The fitness type (higher is better).
    type Fitness: PartialOrd + Copy + Send + Into<f64>;

    /// Draws one random individual.
    fn random_individual<R: Rng>(&self, rng: &mut R) -> Self::Individual;

    /// Scores a single individual.
    fn fitness(&self, individual: &Self::Individual) -> Self::Fitness;

    /// Scores every individual in parallel, preserving order.
    fn evaluate_parallel(&self, individuals: &[Self::Individual]) -> Vec<Self::Fitness> {
        individuals.par_iter().map(|ind| self.fitness(ind)).collect()
    }

    /// Creates the population.
    fn initialize_population<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<Self::Individual> {
        (0..size).map(|_| self.random_individual(rng)).collect()
    }
}

/// Result of a population run.
#[derive(Debug, Clone)]
pub struct PopulationResult<I, F> {
    /// The best individual (None for an empty population).
    pub best: Option<I>,
    /// Population index of the best individual.
    pub best_index: Option<usize>,
    /// Fitness of the best individual.
    pub best_fitness: Option<F>,
    /// Fitness of every individual, in population order.
    pub fitness: Vec<F>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Index of the first maximum, ignoring incomparable values.
pub fn first_best_index<F: PartialOrd>(fitness: &[F]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, f) in fitness.iter().enumerate() {
        match best {
            None => best = Some(i),
            Some(b) if *f > fitness[b] => best = Some(i),
            _ => {}
        }
    }
    best
}

/// Population search runner.
pub struct PopulationRunner<P: PopulationProblem> {
    config: PopulationConfig,
    problem: P,
}

impl<P: PopulationProblem> PopulationRunner<P> {
    /// Creates a new runner.
    pub fn new(config: PopulationConfig, problem: P) -> Self {
        Self { config, problem }
    }

    /// Returns the problem.
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Runs with the configured seed (or entropy).
    pub fn run(&self) -> PopulationResult<P::Individual, P::Fitness> {
        let mut rng = self.config.rng();
        self.run_with_rng(&mut rng)
    }

    /// Runs with a specific random source.
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> PopulationResult<P::Individual, P::Fitness> {
        let start = Instant::now();

        let mut population = self
            .problem
            .initialize_population(self.config.population_size, rng);
        let fitness = self.problem.evaluate_parallel(&population);

        let best_index = first_best_index(&fitness);
        let best_fitness = best_index.map(|i| fitness[i]);
        let best = best_index.map(|i| population.swap_remove(i));

        if let Some(f) = best_fitness {
            let avg = fitness.iter().map(|&f| f.into()).sum::<f64>() / fitness.len() as f64;
            log::debug!(
                "population of {}: best fitness {:.1}, average {:.2}",
                fitness.len(),
                f.into(),
                avg
            );
        }

        PopulationResult {
            best,
            best_index,
            best_fitness,
            fitness,
            elapsed: start.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Individuals are random u32 vectors; fitness counts even entries.
    struct EvenCount {
        len: usize,
    }

    impl PopulationProblem for EvenCount {
        type Individual = Vec<u32>;
        type Fitness = u32;

        fn random_individual<R: Rng>(&self, rng: &mut R) -> Vec<u32> {
            (0..self.len).map(|_| rng.gen_range(0..100)).collect()
        }

        fn fitness(&self, individual: &Vec<u32>) -> u32 {
            individual.iter().filter(|v| *v % 2 == 0).count() as u32
        }
    }

    #[test]
    fn test_first_best_index_prefers_earliest() {
        assert_eq!(first_best_index(&[1, 3, 2, 3]), Some(1));
        assert_eq!(first_best_index::<u32>(&[]), None);
        assert_eq!(first_best_index(&[0.5, 0.5]), Some(0));
    }

    #[test]
    fn test_seeded_runs_match() {
        let config = PopulationConfig::new().with_population_size(32).with_seed(9);
        let a = PopulationRunner::new(config.clone(), EvenCount { len: 10 }).run();
        let b = PopulationRunner::new(config, EvenCount { len: 10 }).run();
        assert_eq!(a.best, b.best);
        assert_eq!(a.fitness, b.fitness);
        assert_eq!(a.best_index, b.best_index);
    }

    #[test]
    fn test_best_has_max_fitness() {
        let config = PopulationConfig::new().with_population_size(20).with_seed(1);
        let result = PopulationRunner::new(config, EvenCount { len: 6 }).run();
        let max = *result.fitness.iter().max().unwrap();
        assert_eq!(result.best_fitness, Some(max));
        let idx = result.best_index.unwrap();
        assert_eq!(result.fitness[idx], max);
        assert!(result.fitness[..idx].iter().all(|&f| f < max));
    }

    #[test]
    fn test_empty_population() {
        let config = PopulationConfig::new().with_population_size(0);
        let result = PopulationRunner::new(config, EvenCount { len: 3 }).run();
        assert!(result.best.is_none());
        assert!(result.fitness.is_empty());
    }
}
