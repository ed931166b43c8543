//! Benchmark Suite for U-Cubepack
//!
//! This crate provides:
//! - JSON problem and solution files
//! - MPV (Martello-Pisinger-Vigo) and Berkey-Wang instance generator
//! - Benchmark runner comparing placement strategies
//! - Result recording (JSON, CSV) and summaries

mod dataset3d;
mod io;
mod result;
mod runner3d;

pub use dataset3d::{Dataset3D, Dataset3DInfo, InstanceClass, InstanceGenerator, Item3D};
pub use io::{
    load_json, load_problem, load_solution, save_json, BlockList, BlockSpec, ProblemFile,
    SolutionFile,
};
pub use result::{BenchmarkMetadata, BenchmarkResult, RunResult, StrategySummary};
pub use runner3d::{BenchmarkConfig3D, BenchmarkRunner3D, BenchmarkSummary3D};
