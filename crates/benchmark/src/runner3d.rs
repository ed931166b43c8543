//! 3D benchmark runner comparing placement strategies.

use crate::dataset3d::Dataset3D;
use crate::result::{BenchmarkResult, RunResult};
use std::time::Instant;
use u_cubepack_core::{Config, Solver, Strategy};
use u_cubepack_d3::capacity::estimate;
use u_cubepack_d3::{audit, BlockType, Container, Packer3D};

/// Configuration for 3D benchmark runs.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig3D {
    /// Strategies to benchmark.
    pub strategies: Vec<Strategy>,
    /// Time limit per run in milliseconds.
    pub time_limit_ms: u64,
    /// Number of runs per configuration (for averaging).
    pub runs_per_config: usize,
    /// Whether to show progress.
    pub show_progress: bool,
    /// Stochastic population size.
    pub population_size: usize,
    /// Base seed; run `i` uses `seed + i`.
    pub seed: u64,
    /// Keep placements in the recorded results.
    pub keep_placements: bool,
}

impl Default for BenchmarkConfig3D {
    fn default() -> Self {
        Self {
            strategies: vec![
                Strategy::Greedy,
                Strategy::Stochastic,
                Strategy::HybridStochastic,
            ],
            time_limit_ms: 10_000,
            runs_per_config: 1,
            show_progress: true,
            population_size: 100,
            seed: 42,
            keep_placements: false,
        }
    }
}

impl BenchmarkConfig3D {
    /// Creates a new benchmark configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the strategies to benchmark.
    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Sets the time limit per run.
    pub fn with_time_limit(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Sets the number of runs per configuration.
    pub fn with_runs_per_config(mut self, n: usize) -> Self {
        self.runs_per_config = n;
        self
    }

    /// Sets the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enables or disables progress output.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Quick preset for fast benchmarking.
    pub fn quick() -> Self {
        Self {
            strategies: vec![Strategy::Greedy, Strategy::HybridStochastic],
            time_limit_ms: 1_000,
            population_size: 50,
            ..Self::default()
        }
    }

    /// Standard preset comparing every strategy.
    pub fn standard() -> Self {
        Self {
            strategies: vec![
                Strategy::Greedy,
                Strategy::Stochastic,
                Strategy::Exact,
                Strategy::HybridStochastic,
                Strategy::HybridExact,
            ],
            time_limit_ms: 30_000,
            runs_per_config: 3,
            ..Self::default()
        }
    }
}

/// 3D benchmark runner.
pub struct BenchmarkRunner3D {
    config: BenchmarkConfig3D,
}

impl BenchmarkRunner3D {
    /// Creates a new benchmark runner.
    pub fn new(config: BenchmarkConfig3D) -> Self {
        Self { config }
    }

    /// Runs benchmarks on a single 3D dataset.
    pub fn run_dataset(&self, dataset: &Dataset3D) -> BenchmarkResult {
        let container = match Container::from_dims(dataset.container) {
            Ok(container) => container,
            Err(e) => {
                if self.config.show_progress {
                    println!("Skipping {}: {}", dataset.name, e);
                }
                return BenchmarkResult::new();
            }
        };

        if self.config.show_progress {
            println!("\nBenchmarking 3D dataset: {}", dataset.name);
            println!("  Instance class: {:?}", dataset.instance_class);
            println!("  Item types: {}", dataset.items.len());
            println!("  Instances: {}", dataset.instance_count());
            println!("  Container: {:?}", dataset.container);
            println!(
                "  Item volume / container volume: {} / {}",
                dataset.total_item_volume(),
                dataset.container_volume()
            );
        }

        self.run_blocks(&dataset.name, &dataset.to_blocks(), &container)
    }

    /// Runs every configured strategy on one request.
    pub fn run_blocks(
        &self,
        name: &str,
        blocks: &[BlockType],
        container: &Container,
    ) -> BenchmarkResult {
        let mut results = BenchmarkResult::new();
        results.metadata.config = format!("{:?}", self.config);

        let bound = estimate(blocks, container, true).count_upper_bound;
        if self.config.show_progress {
            println!("  Count upper bound: {}", bound);
        }

        for strategy in &self.config.strategies {
            if self.config.show_progress {
                println!("  Running {:?}...", strategy);
            }

            for run_idx in 0..self.config.runs_per_config {
                let solver_config = Config::new()
                    .with_strategy(*strategy)
                    .with_time_limit(self.config.time_limit_ms)
                    .with_population_size(self.config.population_size)
                    .with_seed(self.config.seed + run_idx as u64);

                let packer = Packer3D::new(solver_config);

                let start = Instant::now();
                let result = packer.solve(blocks, container);
                let elapsed = start.elapsed().as_millis() as u64;

                match result {
                    Ok(solve_result) => {
                        let verified = audit(container, &solve_result.placements).is_ok();
                        let mut run_result = RunResult::new(
                            name.to_string(),
                            format!("run_{}", run_idx + 1),
                            *strategy,
                            &solve_result,
                            elapsed,
                        )
                        .with_upper_bound(bound)
                        .with_verified(verified);

                        if self.config.keep_placements {
                            run_result =
                                run_result.with_placements(solve_result.placements.clone());
                        }

                        if self.config.show_progress {
                            println!(
                                "    Run {}: placed={}/{}, utilization={:.2}%, time={}ms{}",
                                run_idx + 1,
                                solve_result.placements.len(),
                                solve_result.requested,
                                solve_result.utilization * 100.0,
                                elapsed,
                                run_result
                                    .status
                                    .as_ref()
                                    .map_or(String::new(), |s| format!(", status={}", s))
                            );
                        }

                        results.add_run(run_result);
                    }
                    Err(e) => {
                        if self.config.show_progress {
                            println!("    Run {} failed: {}", run_idx + 1, e);
                        }
                    }
                }
            }
        }

        results
    }

    /// Runs benchmarks on multiple 3D datasets.
    pub fn run_datasets(&self, datasets: &[Dataset3D]) -> BenchmarkResult {
        let mut combined = BenchmarkResult::new();
        combined.metadata.config = format!("{:?}", self.config);

        for dataset in datasets {
            let result = self.run_dataset(dataset);
            for run in result.runs {
                combined.add_run(run);
            }
        }

        combined
    }
}

/// Summary statistics for 3D benchmark results.
#[derive(Debug, Clone)]
pub struct BenchmarkSummary3D {
    /// Dataset name
    pub dataset_name: String,
    /// Strategy used
    pub strategy: String,
    /// Average boxes placed
    pub avg_placed: f64,
    /// Best placed count achieved
    pub best_placed: usize,
    /// Average utilization
    pub avg_utilization: f64,
    /// Average computation time (ms)
    pub avg_time_ms: f64,
    /// Number of runs
    pub num_runs: usize,
}

impl BenchmarkResult {
    /// Computes summary statistics per (dataset, strategy).
    pub fn summary_3d(&self) -> Vec<BenchmarkSummary3D> {
        use std::collections::HashMap;

        let mut grouped: HashMap<(String, String), Vec<&RunResult>> = HashMap::new();

        for run in &self.runs {
            grouped
                .entry((run.dataset.clone(), run.strategy.clone()))
                .or_default()
                .push(run);
        }

        let mut summaries: Vec<BenchmarkSummary3D> = grouped
            .into_iter()
            .map(|((name, strategy), runs)| {
                let num_runs = runs.len();
                let avg_placed =
                    runs.iter().map(|r| r.pieces_placed as f64).sum::<f64>() / num_runs as f64;
                let best_placed = runs.iter().map(|r| r.pieces_placed).max().unwrap_or(0);
                let avg_utilization =
                    runs.iter().map(|r| r.utilization).sum::<f64>() / num_runs as f64;
                let avg_time_ms =
                    runs.iter().map(|r| r.time_ms as f64).sum::<f64>() / num_runs as f64;

                BenchmarkSummary3D {
                    dataset_name: name,
                    strategy,
                    avg_placed,
                    best_placed,
                    avg_utilization,
                    avg_time_ms,
                    num_runs,
                }
            })
            .collect();

        summaries.sort_by(|a, b| {
            a.dataset_name
                .cmp(&b.dataset_name)
                .then(a.strategy.cmp(&b.strategy))
        });

        summaries
    }
}
