//! Benchmark result types and recording.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use u_cubepack_core::{Placement, SolveResult, Strategy};

/// Result of a single benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Dataset name
    pub dataset: String,
    /// Instance name (if applicable)
    pub instance: String,
    /// Strategy used
    pub strategy: String,
    /// Number of boxes placed
    pub pieces_placed: usize,
    /// Number of instances requested
    pub total_pieces: usize,
    /// Utilization ratio (0.0 - 1.0)
    pub utilization: f64,
    /// Computation time in milliseconds
    pub time_ms: u64,
    /// Exact solver status, when the strategy ran one
    pub status: Option<String>,
    /// Volume-based upper bound on the placed count
    pub upper_bound: Option<usize>,
    /// Distance below the upper bound (percentage)
    pub gap_percent: Option<f64>,
    /// Whether the placements survived the occupancy audit
    pub verified: bool,
    /// Placements (optional, for visualization)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placements: Option<Vec<Placement>>,
}

impl RunResult {
    /// Creates a run result from a solve result.
    pub fn new(
        dataset: String,
        instance: String,
        strategy: Strategy,
        result: &SolveResult,
        time_ms: u64,
    ) -> Self {
        Self {
            dataset,
            instance,
            strategy: strategy.name().to_string(),
            pieces_placed: result.placements.len(),
            total_pieces: result.requested,
            utilization: result.utilization,
            time_ms,
            status: result.solution_status().map(|s| format!("{:?}", s)),
            upper_bound: None,
            gap_percent: None,
            verified: false,
            placements: None,
        }
    }

    /// Sets the placements for visualization.
    pub fn with_placements(mut self, placements: Vec<Placement>) -> Self {
        self.placements = Some(placements);
        self
    }

    /// Sets the count upper bound and calculates the gap.
    pub fn with_upper_bound(mut self, bound: usize) -> Self {
        self.upper_bound = Some(bound);
        if bound > 0 {
            let missing = bound.saturating_sub(self.pieces_placed) as f64;
            self.gap_percent = Some(missing / bound as f64 * 100.0);
        }
        self
    }

    /// Records the audit outcome.
    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }
}

/// Collection of benchmark results.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Individual run results
    pub runs: Vec<RunResult>,
    /// Seconds since the Unix epoch when the benchmark was started
    pub timestamp: u64,
    /// Additional metadata
    pub metadata: BenchmarkMetadata,
}

/// Metadata about the benchmark run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BenchmarkMetadata {
    /// Crate version
    pub version: String,
    /// Configuration used
    pub config: String,
}

impl BenchmarkResult {
    /// Creates a new benchmark result.
    pub fn new() -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        Self {
            runs: Vec::new(),
            timestamp,
            metadata: BenchmarkMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                config: String::new(),
            },
        }
    }

    /// Adds a run result.
    pub fn add_run(&mut self, result: RunResult) {
        self.runs.push(result);
    }

    /// Saves results to a JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    /// Saves results to a CSV file.
    pub fn save_csv(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let mut file = File::create(path)?;

        writeln!(
            file,
            "dataset,instance,strategy,pieces_placed,total_pieces,utilization,time_ms,status,upper_bound,gap_percent,verified"
        )?;

        for run in &self.runs {
            writeln!(
                file,
                "{},{},{},{},{},{:.4},{},{},{},{},{}",
                run.dataset,
                run.instance,
                run.strategy,
                run.pieces_placed,
                run.total_pieces,
                run.utilization,
                run.time_ms,
                run.status.as_deref().unwrap_or(""),
                run.upper_bound.map_or(String::new(), |b| b.to_string()),
                run.gap_percent
                    .map_or(String::new(), |g| format!("{:.2}", g)),
                run.verified,
            )?;
        }

        Ok(())
    }

    /// Prints a summary table to stdout.
    pub fn print_summary(&self) {
        println!("\n{:=<100}", "");
        println!("BENCHMARK RESULTS");
        println!("{:=<100}", "");
        println!(
            "{:<20} {:<10} {:<18} {:>10} {:>8} {:>10} {:>8} {:>8}",
            "Dataset", "Instance", "Strategy", "Placed", "Util%", "Time(ms)", "Gap%", "Valid"
        );
        println!("{:-<100}", "");

        for run in &self.runs {
            let gap_str = run
                .gap_percent
                .map_or("-".to_string(), |g| format!("{:.1}", g));
            println!(
                "{:<20} {:<10} {:<18} {:>10} {:>8.1} {:>10} {:>8} {:>8}",
                run.dataset,
                run.instance,
                run.strategy,
                format!("{}/{}", run.pieces_placed, run.total_pieces),
                run.utilization * 100.0,
                run.time_ms,
                gap_str,
                if run.verified { "yes" } else { "NO" }
            );
        }

        println!("{:=<100}\n", "");
    }

    /// Computes summary statistics grouped by strategy, sorted by name.
    pub fn summary_by_strategy(&self) -> Vec<StrategySummary> {
        let mut by_strategy: HashMap<String, Vec<&RunResult>> = HashMap::new();
        for run in &self.runs {
            by_strategy
                .entry(run.strategy.clone())
                .or_default()
                .push(run);
        }

        let mut summaries: Vec<StrategySummary> = by_strategy
            .into_iter()
            .map(|(strategy, runs)| {
                let n = runs.len() as f64;
                let avg_utilization = runs.iter().map(|r| r.utilization).sum::<f64>() / n;
                let avg_placed = runs.iter().map(|r| r.pieces_placed).sum::<usize>() as f64 / n;
                let avg_time = runs.iter().map(|r| r.time_ms).sum::<u64>() as f64 / n;
                let avg_gap = {
                    let gaps: Vec<f64> = runs.iter().filter_map(|r| r.gap_percent).collect();
                    if gaps.is_empty() {
                        None
                    } else {
                        Some(gaps.iter().sum::<f64>() / gaps.len() as f64)
                    }
                };

                StrategySummary {
                    strategy,
                    run_count: runs.len(),
                    avg_placed,
                    avg_utilization,
                    avg_time_ms: avg_time as u64,
                    avg_gap_percent: avg_gap,
                }
            })
            .collect();
        summaries.sort_by(|a, b| a.strategy.cmp(&b.strategy));
        summaries
    }
}

/// Summary statistics for a strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySummary {
    pub strategy: String,
    pub run_count: usize,
    pub avg_placed: f64,
    pub avg_utilization: f64,
    pub avg_time_ms: u64,
    pub avg_gap_percent: Option<f64>,
}
