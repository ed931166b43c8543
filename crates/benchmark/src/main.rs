//! U-Cubepack Benchmark Runner CLI

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use u_cubepack_benchmark::{
    load_problem, load_solution, save_json, BenchmarkConfig3D, BenchmarkResult, BenchmarkRunner3D,
    InstanceClass, InstanceGenerator, ProblemFile, SolutionFile,
};
use u_cubepack_core::{Config, ExactObjective, FailurePolicy, SearchOrder, Solver, Strategy};
use u_cubepack_d3::{verify_solution, Packer3D};

#[derive(Parser)]
#[command(name = "bench-runner")]
#[command(about = "Block placement solver and benchmark runner for U-Cubepack")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem file with one strategy
    Solve {
        /// Path to the JSON problem file
        file: PathBuf,

        /// Placement strategy
        #[arg(short, long, value_enum, default_value = "greedy")]
        strategy: StrategyArg,

        /// Time limit in milliseconds (exact strategies)
        #[arg(short, long, default_value = "10000")]
        time_limit: u64,

        /// Relative optimality gap accepted by the exact model
        #[arg(long, default_value = "0.0")]
        gap: f64,

        /// Exact objective
        #[arg(long, value_enum, default_value = "count")]
        objective: ObjectiveArg,

        /// Order applied to the blocks before greedy runs
        #[arg(long, value_enum, default_value = "volume-descending")]
        order: OrderArg,

        /// Keep scanning after the first block that does not fit
        #[arg(long)]
        skip_failures: bool,

        /// Forbid rotations
        #[arg(long)]
        no_rotation: bool,

        /// Stochastic population size
        #[arg(short, long, default_value = "100")]
        population: usize,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output file for the solution (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that a solution file is non-overlapping and in bounds
    Verify {
        /// Path to the JSON solution file
        file: PathBuf,
    },

    /// Generate MPV / Berkey-Wang problem files
    Generate {
        /// Instance class (MPV1-5, BW6-8, Custom); all standard classes if omitted
        #[arg(short, long)]
        class: Option<String>,

        /// Number of item types per instance
        #[arg(short = 'n', long, default_value = "10")]
        items: usize,

        /// Cubic container edge
        #[arg(short, long, default_value = "20")]
        bin: u32,

        /// Instances per class
        #[arg(short, long, default_value = "1")]
        instances: usize,

        /// Random seed (single class only)
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output directory
        #[arg(short, long, default_value = "datasets/3d")]
        output: PathBuf,
    },

    /// Compare strategies on a problem file or on generated instances
    Compare {
        /// Path to a JSON problem file; generated instances are used if omitted
        file: Option<PathBuf>,

        /// Preset configuration
        #[arg(short, long, value_enum, default_value = "quick")]
        preset: Preset,

        /// Strategies to compare (overrides the preset)
        #[arg(short, long, value_enum)]
        strategies: Vec<StrategyArg>,

        /// Time limit per run in milliseconds (overrides the preset)
        #[arg(short, long)]
        time_limit: Option<u64>,

        /// Number of runs per configuration (overrides the preset)
        #[arg(short, long)]
        runs: Option<usize>,

        /// Item types per generated instance
        #[arg(short = 'n', long, default_value = "8")]
        items: usize,

        /// Cubic container edge for generated instances
        #[arg(short, long, default_value = "12")]
        bin: u32,

        /// Output file for results (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for CSV results
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// First-fit greedy scan
    Greedy,
    /// Random population with collision filter
    Stochastic,
    /// Exact per-cell 0/1 model
    Exact,
    /// Stochastic warm start + greedy fill
    HybridStochastic,
    /// Exact warm start + greedy fill
    HybridExact,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Greedy => Strategy::Greedy,
            StrategyArg::Stochastic => Strategy::Stochastic,
            StrategyArg::Exact => Strategy::Exact,
            StrategyArg::HybridStochastic => Strategy::HybridStochastic,
            StrategyArg::HybridExact => Strategy::HybridExact,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ObjectiveArg {
    Count,
    Volume,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    AsGiven,
    VolumeDescending,
    VolumeAscending,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// Greedy and stochastic hybrid, 1s limit
    Quick,
    /// All strategies, 30s limit, 3 runs
    Standard,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            file,
            strategy,
            time_limit,
            gap,
            objective,
            order,
            skip_failures,
            no_rotation,
            population,
            seed,
            output,
        } => {
            let problem = load_problem(&file)?;
            let container = problem.container()?;
            let blocks = problem.to_blocks();

            let mut config = Config::new()
                .with_strategy(strategy.into())
                .with_time_limit(time_limit)
                .with_gap_tolerance(gap)
                .with_objective(match objective {
                    ObjectiveArg::Count => ExactObjective::Count,
                    ObjectiveArg::Volume => ExactObjective::Volume,
                })
                .with_search_order(match order {
                    OrderArg::AsGiven => SearchOrder::AsGiven,
                    OrderArg::VolumeDescending => SearchOrder::VolumeDescending,
                    OrderArg::VolumeAscending => SearchOrder::VolumeAscending,
                })
                .with_rotation(!no_rotation)
                .with_population_size(population);
            if skip_failures {
                config = config.with_failure_policy(FailurePolicy::SkipAndContinue);
            }
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }

            let packer = Packer3D::new(config);
            let estimate = packer.estimate_capacity(&blocks, &container);
            let result = packer.solve(&blocks, &container)?;

            println!("Strategy:     {}", result.strategy.as_deref().unwrap_or("-"));
            println!("Placed:       {}/{}", result.placements.len(), result.requested);
            println!("Upper bound:  {}", estimate.count_upper_bound);
            println!("Utilization:  {}", result.utilization_percent());
            println!("Time:         {}ms", result.computation_time_ms);
            if let Some(status) = result.solution_status() {
                println!("Exact status: {:?}", status);
            }
            if result.timed_out_without_solution() {
                println!("  (time limit reached before any solution was found)");
            }
            for id in &result.unplaceable {
                println!("  unplaceable: {}", id);
            }

            if let Some(path) = output {
                save_json(&SolutionFile::new(&container, result.placements), &path)?;
                println!("Solution saved to: {}", path.display());
            }
        }

        Commands::Verify { file } => {
            let solution = load_solution(&file)?;
            let container = solution.container()?;
            verify_solution(&container, &solution.placements)
                .with_context(|| format!("{} is not a valid solution", file.display()))?;
            println!(
                "OK: {} placements fit {:?} without overlap",
                solution.placements.len(),
                solution.container
            );
        }

        Commands::Generate {
            class,
            items,
            bin,
            instances,
            seed,
            output,
        } => {
            std::fs::create_dir_all(&output)?;
            let datasets = match class {
                Some(id) => {
                    let Some(class) = InstanceClass::from_id(&id) else {
                        bail!("Unknown instance class: {}", id);
                    };
                    (0..instances)
                        .map(|i| {
                            let mut ds = InstanceGenerator::new(bin)
                                .with_seed(seed + i as u64)
                                .generate(class, items);
                            ds.name = format!("{}_i{}", ds.name, i + 1);
                            ds
                        })
                        .collect()
                }
                None => InstanceGenerator::new(bin).generate_batch(items, instances),
            };

            println!("Generating {} instances to {}...", datasets.len(), output.display());
            for ds in &datasets {
                let path = output.join(format!("{}.json", ds.name));
                save_json(&ProblemFile::from_dataset(ds), &path)?;
                println!("  {} ... OK ({} instances)", ds.name, ds.instance_count());
            }
        }

        Commands::Compare {
            file,
            preset,
            strategies,
            time_limit,
            runs,
            items,
            bin,
            output,
            csv,
        } => {
            let mut config = match preset {
                Preset::Quick => BenchmarkConfig3D::quick(),
                Preset::Standard => BenchmarkConfig3D::standard(),
            };
            if !strategies.is_empty() {
                config = config.with_strategies(strategies.into_iter().map(Into::into).collect());
            }
            if let Some(ms) = time_limit {
                config = config.with_time_limit(ms);
            }
            if let Some(n) = runs {
                config = config.with_runs_per_config(n);
            }

            let runner = BenchmarkRunner3D::new(config);
            let results: BenchmarkResult = match file {
                Some(path) => {
                    let problem = load_problem(&path)?;
                    let name = path
                        .file_stem()
                        .map_or("problem".to_string(), |s| s.to_string_lossy().into_owned());
                    println!("\nBenchmarking problem file: {}", path.display());
                    runner.run_blocks(&name, &problem.to_blocks(), &problem.container()?)
                }
                None => runner.run_datasets(&InstanceGenerator::new(bin).generate_batch(items, 1)),
            };

            results.print_summary();

            println!("\nStrategy Comparison:");
            println!("{:-<70}", "");
            for summary in results.summary_by_strategy() {
                println!(
                    "  {:<18} runs={:<3} avg_placed={:<7.1} avg_util={:.1}% avg_time={}ms",
                    summary.strategy,
                    summary.run_count,
                    summary.avg_placed,
                    summary.avg_utilization * 100.0,
                    summary.avg_time_ms
                );
            }

            if let Some(path) = output {
                results.save_json(&path)?;
                println!("\nResults saved to: {}", path.display());
            }

            if let Some(path) = csv {
                results.save_csv(&path)?;
                println!("CSV saved to: {}", path.display());
            }
        }
    }

    Ok(())
}
